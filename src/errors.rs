//! Error types for per-file extraction
//!
//! Only genuine faults live here. A template that does not match, a missing docstring or an
//! unsupported statement shape are ordinary empty values in the info tree.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce an info tree for one file
#[derive(Debug, Error)]
pub enum DocInfoError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load the python grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("parser produced no tree for {}", path.display())]
    Parse { path: PathBuf },

    #[error("{} is not a python source file", path.display())]
    UnsupportedFile { path: PathBuf },
}

/// A `docinfo:` directive line that could not be understood
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("line {line}: expected `name = value`, found {text:?}")]
    MissingAssignment { line: usize, text: String },

    #[error("line {line}: {name:?} is not a valid configuration name")]
    InvalidName { line: usize, name: String },

    #[error("line {line}: unterminated string in {text:?}")]
    UnterminatedString { line: usize, text: String },
}
