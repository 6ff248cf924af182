//! Extraction configuration and per-module `docinfo:` directives
//!
//! A module can override configuration values from comment lines in its leading comment block:
//!
//! ```text
//! # docinfo: docstring_format = "reStructuredText"; author = 'Jane'
//! ```
//!
//! Malformed assignments are reported as [`DirectiveError`]s and skipped; everything that did
//! parse is kept and merged over [`ExtractionConfig::defaults`].

use std::collections::BTreeMap;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::errors::DirectiveError;

/// Configuration values visible to a node, by name
pub type ConfigValues = BTreeMap<String, String>;

pub const DOCSTRING_FORMAT_KEY: &str = "docstring_format";
pub const DEFAULT_DOCSTRING_FORMAT: &str = "StructuredText";

static DIRECTIVE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*#\s*docinfo:(?P<payload>.+)$").unwrap());

static CONFIG_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Options for one extraction run
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Attach comment blocks to nodes. When false every node has empty comment text.
    pub include_comments: bool,
    /// Values every module starts from before its own directives are applied
    pub defaults: ConfigValues,
    /// When set, owning files are stored relative to this root in Unix style
    pub workspace_root: Option<PathBuf>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let mut defaults = ConfigValues::new();
        defaults.insert(
            DOCSTRING_FORMAT_KEY.to_string(),
            DEFAULT_DOCSTRING_FORMAT.to_string(),
        );
        Self {
            include_comments: true,
            defaults,
            workspace_root: None,
        }
    }
}

impl ExtractionConfig {
    /// Defaults overlaid with the directives found in `source`
    ///
    /// Directive problems are logged and do not prevent the remaining values from applying.
    pub fn module_config(&self, source: &str) -> ConfigValues {
        let (directives, errors) = parse_config_directives(source);
        for error in &errors {
            warn!("Ignoring malformed docinfo directive: {}", error);
        }

        let mut values = self.defaults.clone();
        values.extend(directives);
        values
    }
}

/// Parse the `docinfo:` directives of the leading comment block
///
/// Scanning stops at the first line that is blank or not a comment.
pub fn parse_config_directives(source: &str) -> (ConfigValues, Vec<DirectiveError>) {
    let mut values = ConfigValues::new();
    let mut errors = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || !trimmed.starts_with('#') {
            break;
        }
        let Some(captures) = DIRECTIVE_PATTERN.captures(line) else {
            continue;
        };
        let payload = captures.name("payload").map_or("", |m| m.as_str());
        parse_assignments(payload, index + 1, &mut values, &mut errors);
    }

    (values, errors)
}

fn parse_assignments(
    payload: &str,
    line: usize,
    values: &mut ConfigValues,
    errors: &mut Vec<DirectiveError>,
) {
    let segments = match split_outside_quotes(payload) {
        Some(segments) => segments,
        None => {
            errors.push(DirectiveError::UnterminatedString {
                line,
                text: payload.trim().to_string(),
            });
            return;
        }
    };

    for segment in segments {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        match parse_assignment(segment, line) {
            Ok((name, value)) => {
                values.insert(name, value);
            }
            Err(error) => errors.push(error),
        }
    }
}

/// Split on `;` outside quoted strings, `None` when a quote is left open
fn split_outside_quotes(payload: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (offset, c) in payload.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some(_), '\\') => escaped = true,
            (Some(open), c) if c == open => quote = None,
            (None, '\'' | '"') => quote = Some(c),
            (None, ';') => {
                segments.push(&payload[start..offset]);
                start = offset + 1;
            }
            _ => {}
        }
    }

    if quote.is_some() {
        return None;
    }
    segments.push(&payload[start..]);
    Some(segments)
}

fn parse_assignment(segment: &str, line: usize) -> Result<(String, String), DirectiveError> {
    let (name, value) =
        segment
            .split_once('=')
            .ok_or_else(|| DirectiveError::MissingAssignment {
                line,
                text: segment.to_string(),
            })?;

    let name = name.trim();
    if !CONFIG_NAME_PATTERN.is_match(name) {
        return Err(DirectiveError::InvalidName {
            line,
            name: name.to_string(),
        });
    }

    let value = value.trim();
    let value = match value.chars().next() {
        Some(quote @ ('\'' | '"')) => {
            if value.len() < 2 || !value.ends_with(quote) {
                return Err(DirectiveError::UnterminatedString {
                    line,
                    text: segment.to_string(),
                });
            }
            unescape(&value[1..value.len() - 1])
        }
        _ => value.to_string(),
    };

    Ok((name.to_string(), value))
}

fn unescape(quoted: &str) -> String {
    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
