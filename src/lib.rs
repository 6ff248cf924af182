// DocInfo Core - Python source analysis for documentation generators
//
// Builds a module/class/function info tree for each Python source file, with docstrings,
// associated comment blocks, base classes, class members, imports and scoped name lookup.
// Formatters that render the tree into HTML/XML/text live outside this crate.

pub mod comments;
pub mod config;
pub mod cst;
pub mod errors;
pub mod info;
pub mod language;
pub mod manager;
pub mod pattern;
pub mod utils;

pub use comments::{extract_comments, CommentTable};
pub use config::{parse_config_directives, ConfigValues, ExtractionConfig};
pub use cst::{parse_python, Cst, Symbol, TokenKind};
pub use errors::{DirectiveError, DocInfoError};
pub use info::{InfoRef, InfoTree, NodeKind};
pub use manager::{BatchFileResult, DocInfoManager};
pub use pattern::{lenient_match, strict_match, MatchResult, Pattern};
