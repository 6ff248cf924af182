//! Comment extraction from raw source text
//!
//! Comment blocks are associated with the nearest class or function definition by scanning the
//! text line by line, independently of the parse tree. Nesting is recovered from indentation
//! alone: a [`ParseStack`] of `(name, indent)` pairs pops every entry at the same or deeper
//! indent before pushing a new definition.
//!
//! The result is a [`CommentTable`] keyed by the qualified-name path of each definition
//! (`["Foo"]`, `["Foo", "bar"]`). The module itself contributes nothing to the key.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::trace;

/// One source line: blank, a `class`/`def` header, or a comment line
static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?P<blank>\s*$)|(?P<named>(?P<indent>[ \t]*)(?:async\s+)?(?P<kind>class|def)\s+(?P<name>[0-9A-Za-z_]+))|(?P<comment_line>\s*#+(?P<comment>.*)))",
    )
    .unwrap()
});

/// Separator rules such as `# ------` or `#=====`
static DECORATIVE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-+=#][-+=# ]*\s*$").unwrap());

/// Qualified-name path to associated comment text, latest binding wins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommentTable {
    entries: HashMap<Vec<String>, String>,
}

impl CommentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &[String]) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &[String]) -> bool {
        self.entries.contains_key(path)
    }

    pub fn insert(&mut self, path: Vec<String>, text: String) {
        self.entries.insert(path, text);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &Vec<String>> {
        self.entries.keys()
    }
}

/// Stack of enclosing definitions, bottom first
#[derive(Debug, Clone, Default)]
pub struct ParseStack {
    entries: Vec<(String, usize)>,
}

impl ParseStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `name`, first popping every entry whose indent is >= `indent`
    pub fn push(&mut self, name: &str, indent: usize) {
        while self
            .entries
            .last()
            .is_some_and(|(_, top_indent)| indent <= *top_indent)
        {
            self.entries.pop();
        }
        self.entries.push((name.to_string(), indent));
    }

    pub fn pop(&mut self) -> Option<String> {
        self.entries.pop().map(|(name, _)| name)
    }

    /// Names on the stack, bottom first
    pub fn key(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}

/// Build the comment table for one file
pub fn extract_comments(text: &str) -> CommentTable {
    let mut table = CommentTable::new();
    let mut stack = ParseStack::new();
    let mut buffer = String::new();
    let mut current_name: Option<String> = None;

    for line in text.lines() {
        let Some(captures) = LINE_PATTERN.captures(line) else {
            // Undocumented code ends any pending association
            current_name = None;
            buffer.clear();
            continue;
        };

        if captures.name("comment_line").is_some() {
            let comment = captures.name("comment").map_or("", |m| m.as_str());
            let comment = if comment.is_empty() { " " } else { comment };
            if !DECORATIVE_PATTERN.is_match(comment) {
                buffer.push_str(comment);
                buffer.push('\n');
            }
        } else if let Some(name) = captures.name("name") {
            let name = name.as_str();
            let indent = captures.name("indent").map_or(0, |m| m.as_str().len());

            if buffer.is_empty() {
                current_name = Some(name.to_string());
                stack.push(name, indent);
            } else if current_name.is_some() {
                // The pending block belongs to the previous definition
                table.insert(stack.key(), std::mem::take(&mut buffer));
                stack.push(name, indent);
            } else {
                stack.push(name, indent);
                table.insert(stack.key(), std::mem::take(&mut buffer));
                current_name = None;
            }
        } else if captures.name("blank").is_some() {
            if !buffer.is_empty() && current_name.is_some() {
                let key = stack.key();
                if !table.contains(&key) {
                    table.insert(key, buffer.clone());
                }
            }
            current_name = None;
            buffer.clear();
        }
    }

    if current_name.is_some() && !buffer.is_empty() {
        table.insert(stack.key(), buffer);
    }

    trace!("Extracted {} comment blocks", table.len());
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_comments_above_nested_definitions() {
        let source = "# Documents Foo\nclass Foo:\n    # Documents bar\n    def bar(self): pass\n";
        let table = extract_comments(source);

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&path(&["Foo"])), Some(" Documents Foo\n"));
        assert_eq!(table.get(&path(&["Foo", "bar"])), Some(" Documents bar\n"));
    }

    #[test]
    fn test_buffer_with_pending_name_documents_previous_definition() {
        // `Outer` has no comment above it; the block after its header is followed directly
        // by a nested definition and still documents `Outer`.
        let source = "class Outer:\n    # About Outer\n    def inner(self):\n        pass\n";
        let table = extract_comments(source);

        assert_eq!(table.get(&path(&["Outer"])), Some(" About Outer\n"));
        assert_eq!(
            table.get(&path(&["Outer", "inner"])),
            None,
            "the nested definition must not inherit the block"
        );
    }

    #[test]
    fn test_buffer_without_pending_name_documents_next_definition() {
        let source = "x = 1\n# About helper\ndef helper():\n    pass\n";
        let table = extract_comments(source);
        assert_eq!(table.get(&path(&["helper"])), Some(" About helper\n"));
    }

    #[test]
    fn test_pending_name_survives_flush_to_previous_path() {
        // After flushing to `Outer`, `inner` is not the pending name, so the next block is
        // still attributed through the earlier-name branch.
        let source = "class Outer:\n    # first\n    def inner(self):\n        # second\n        def deepest():\n            pass\n";
        let table = extract_comments(source);

        assert_eq!(table.get(&path(&["Outer"])), Some(" first\n"));
        assert_eq!(table.get(&path(&["Outer", "inner"])), Some(" second\n"));
    }

    #[test]
    fn test_blank_line_terminates_association() {
        let source = "# Stray note\n\ndef documented():\n    pass\n";
        let table = extract_comments(source);
        assert!(table.is_empty(), "a comment never jumps over a blank line");

        let trailing = "def f():\n    # Trailing block for f\n\n    pass\n";
        let table = extract_comments(trailing);
        assert_eq!(table.get(&path(&["f"])), Some(" Trailing block for f\n"));
    }

    #[test]
    fn test_blank_line_does_not_overwrite_recorded_path() {
        let source = "def f():\n    # one\n\ndef f():\n    # two\n\n";
        let table = extract_comments(source);
        assert_eq!(
            table.get(&path(&["f"])),
            Some(" one\n"),
            "a trailing block only fills a path that has no comment yet"
        );
    }

    #[test]
    fn test_code_line_resets_buffer() {
        let source = "# About x\nx = 1\ndef f():\n    pass\n";
        let table = extract_comments(source);
        assert!(table.is_empty());
    }

    #[test]
    fn test_decorative_lines_are_ignored() {
        let source = "# -----------\n# Helpers\n# ===========\ndef helper():\n    pass\n";
        let table = extract_comments(source);
        assert_eq!(table.get(&path(&["helper"])), Some(" Helpers\n"));
    }

    #[test]
    fn test_bare_hash_lines_become_spacers() {
        let source = "#\n# Spaced\n#\ndef spaced():\n    pass\n";
        let table = extract_comments(source);
        assert_eq!(table.get(&path(&["spaced"])), Some(" \n Spaced\n \n"));
    }

    #[test]
    fn test_sibling_definitions_bind_to_following_name() {
        let source = "class A:\n    pass\n# About B\nclass B:\n    pass\n# About C\nclass C:\n    pass\n";
        let table = extract_comments(source);

        assert_eq!(table.get(&path(&["B"])), Some(" About B\n"));
        assert_eq!(table.get(&path(&["C"])), Some(" About C\n"));
        assert_eq!(table.get(&path(&["A"])), None);
    }

    #[test]
    fn test_dedent_pops_stale_scopes() {
        let source = "class A:\n    def method(self):\n        pass\n# About top\ndef top():\n    pass\n";
        let table = extract_comments(source);
        assert_eq!(table.get(&path(&["top"])), Some(" About top\n"));
        assert!(!table.contains(&path(&["A", "method", "top"])));
    }

    #[test]
    fn test_parse_stack_pops_equal_and_deeper_indents() {
        let mut stack = ParseStack::new();
        stack.push("A", 0);
        stack.push("m", 4);
        stack.push("inner", 8);
        assert_eq!(stack.key(), path(&["A", "m", "inner"]));

        stack.push("n", 4);
        assert_eq!(stack.key(), path(&["A", "n"]));

        stack.push("B", 0);
        assert_eq!(stack.key(), path(&["B"]));
        assert_eq!(stack.pop(), Some("B".to_string()));
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_latest_binding_wins() {
        let source = "# First\ndef f():\n    pass\n\n# Second\ndef f():\n    pass\n";
        let table = extract_comments(source);
        assert_eq!(table.get(&path(&["f"])), Some(" Second\n"));
    }

    #[test]
    fn test_end_of_file_flushes_pending_block() {
        let source = "def last():\n    # closing remarks";
        let table = extract_comments(source);
        assert_eq!(table.get(&path(&["last"])), Some(" closing remarks\n"));
    }

    #[test]
    fn test_async_definitions_are_named() {
        let source = "# Fetches\nasync def fetch():\n    pass\n";
        let table = extract_comments(source);
        assert_eq!(table.get(&path(&["fetch"])), Some(" Fetches\n"));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let source = include_str!("../test_samples/commented.py");
        assert_eq!(extract_comments(source), extract_comments(source));
    }
}
