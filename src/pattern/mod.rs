//! Structural pattern matching over the CST
//!
//! A [`Pattern`] has the same shape as a [`Cst`] except that any position may be a capture
//! which matches anything and binds it. Two matchers are provided:
//!
//! - [`strict_match`]: the node must mirror the template position for position.
//! - [`lenient_match`]: the template only needs to describe the top of the node; matching stops
//!   once the template is exhausted.
//!
//! A non-match is an ordinary result. Callers check `matched` and try the next template.
//!
//! Module layout:
//! - `templates.rs`: the fixed templates used by the info builder

pub mod templates;

use std::collections::HashMap;

use crate::cst::{Cst, Symbol, TokenKind};

/// Template describing the expected shape of a CST subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Matches any subtree and binds it under the given name
    Capture(String),
    /// Matches an interior node with this tag
    Node {
        symbol: Symbol,
        children: Vec<Pattern>,
    },
    /// Matches a leaf with exactly this token kind and text
    Leaf { token: TokenKind, text: String },
    /// Matches any leaf of this token kind and binds it
    TokenCapture { token: TokenKind, name: String },
}

impl Pattern {
    pub fn capture(name: &str) -> Self {
        Pattern::Capture(name.to_string())
    }

    pub fn node(symbol: Symbol, children: Vec<Pattern>) -> Self {
        Pattern::Node { symbol, children }
    }

    pub fn leaf(token: TokenKind, text: &str) -> Self {
        Pattern::Leaf {
            token,
            text: text.to_string(),
        }
    }

    pub fn token_capture(token: TokenKind, name: &str) -> Self {
        Pattern::TokenCapture {
            token,
            name: name.to_string(),
        }
    }

    /// Wrap `innermost` in single-child nodes, `symbols[0]` outermost
    pub fn chain(symbols: &[Symbol], innermost: Pattern) -> Self {
        symbols
            .iter()
            .rev()
            .fold(innermost, |inner, symbol| Pattern::node(*symbol, vec![inner]))
    }
}

/// Outcome of matching one template against one subtree
///
/// Bindings are only meaningful when `matched` is true.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult<'a> {
    pub matched: bool,
    pub bindings: HashMap<String, &'a Cst>,
}

impl<'a> MatchResult<'a> {
    /// Bound subtree for `name`, only when the match succeeded
    pub fn get(&self, name: &str) -> Option<&'a Cst> {
        if self.matched {
            self.bindings.get(name).copied()
        } else {
            None
        }
    }
}

/// Exact structural match modulo captures
///
/// Leaves must be equal, except that an empty template leaf accepts a CST leaf whose text starts
/// with `#`: the front end stores same-line comments in NEWLINE leaves.
pub fn strict_match<'a>(template: &Pattern, node: &'a Cst) -> MatchResult<'a> {
    let mut bindings = HashMap::new();
    let matched = strict_into(template, node, &mut bindings);
    MatchResult { matched, bindings }
}

/// Prefix match: the template may describe only the top of the subtree
///
/// Every position the template names must match. Extra trailing children in the CST are
/// ignored, but a template with more children than the node fails.
pub fn lenient_match<'a>(template: &Pattern, node: &'a Cst) -> MatchResult<'a> {
    let mut bindings = HashMap::new();
    let matched = lenient_into(template, node, &mut bindings);
    MatchResult { matched, bindings }
}

fn bind_leaf<'a>(
    template: &Pattern,
    node: &'a Cst,
    bindings: &mut HashMap<String, &'a Cst>,
) -> Option<bool> {
    match (template, node) {
        (Pattern::Capture(name), _) => {
            bindings.insert(name.clone(), node);
            Some(true)
        }
        (Pattern::TokenCapture { token, name }, Cst::Leaf { token: found, .. }) => {
            if token == found {
                bindings.insert(name.clone(), node);
                Some(true)
            } else {
                Some(false)
            }
        }
        _ => None,
    }
}

fn strict_into<'a>(
    template: &Pattern,
    node: &'a Cst,
    bindings: &mut HashMap<String, &'a Cst>,
) -> bool {
    if let Some(matched) = bind_leaf(template, node, bindings) {
        return matched;
    }
    match (template, node) {
        (
            Pattern::Leaf { token, text },
            Cst::Leaf {
                token: found,
                text: found_text,
            },
        ) => (token == found && text == found_text) || (text.is_empty() && found_text.starts_with('#')),
        (
            Pattern::Node { symbol, children },
            Cst::Node {
                symbol: found,
                children: found_children,
            },
        ) => {
            symbol == found
                && children.len() == found_children.len()
                && children
                    .iter()
                    .zip(found_children)
                    .all(|(child, found_child)| strict_into(child, found_child, bindings))
        }
        _ => false,
    }
}

fn lenient_into<'a>(
    template: &Pattern,
    node: &'a Cst,
    bindings: &mut HashMap<String, &'a Cst>,
) -> bool {
    if let Some(matched) = bind_leaf(template, node, bindings) {
        return matched;
    }
    match (template, node) {
        (
            Pattern::Leaf { token, text },
            Cst::Leaf {
                token: found,
                text: found_text,
            },
        ) => token == found && text == found_text,
        (
            Pattern::Node { symbol, children },
            Cst::Node {
                symbol: found,
                children: found_children,
            },
        ) => {
            // Template positions past the end of the node only match as captures, and bind nothing
            let surplus = &children[children.len().min(found_children.len())..];
            symbol == found
                && surplus
                    .iter()
                    .all(|extra| matches!(extra, Pattern::Capture(_)))
                && children
                    .iter()
                    .zip(found_children)
                    .all(|(child, found_child)| lenient_into(child, found_child, bindings))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::EXPRESSION_CHAIN;

    fn name(text: &str) -> Cst {
        Cst::leaf(TokenKind::Name, text)
    }

    /// `test -> ... -> power(atom(NAME))`
    fn bare_name(text: &str) -> Cst {
        EXPRESSION_CHAIN.iter().rev().fold(
            Cst::node(Symbol::Atom, vec![name(text)]),
            |inner, symbol| Cst::node(*symbol, vec![inner]),
        )
    }

    #[test]
    fn test_capture_binds_anything() {
        let node = Cst::node(Symbol::Atom, vec![name("x")]);
        let result = strict_match(&Pattern::capture("any"), &node);
        assert!(result.matched);
        assert_eq!(result.get("any"), Some(&node));

        let result = lenient_match(&Pattern::capture("leaf"), &node.children()[0]);
        assert_eq!(result.get("leaf"), Some(&node.children()[0]));
    }

    #[test]
    fn test_strict_requires_equal_length() {
        let node = Cst::node(Symbol::Testlist, vec![name("a"), name("b")]);

        let exact = Pattern::node(
            Symbol::Testlist,
            vec![Pattern::capture("first"), Pattern::leaf(TokenKind::Name, "b")],
        );
        let result = strict_match(&exact, &node);
        assert!(result.matched);
        assert_eq!(result.get("first"), Some(&name("a")));

        let prefix = Pattern::node(Symbol::Testlist, vec![Pattern::capture("first")]);
        assert!(!strict_match(&prefix, &node).matched);
        assert!(lenient_match(&prefix, &node).matched, "lenient accepts a prefix");
    }

    #[test]
    fn test_strict_leaf_comparison() {
        let template = Pattern::leaf(TokenKind::Name, "import");
        assert!(strict_match(&template, &name("import")).matched);
        assert!(!strict_match(&template, &name("from")).matched);
        assert!(!strict_match(&template, &Cst::leaf(TokenKind::String, "import")).matched);
    }

    #[test]
    fn test_strict_skips_comment_leaves_for_empty_placeholder() {
        let template = Pattern::leaf(TokenKind::Newline, "");
        let commented = Cst::leaf(TokenKind::Newline, "# trailing note");
        assert!(strict_match(&template, &commented).matched);
        assert!(!lenient_match(&template, &commented).matched);

        let named = Pattern::leaf(TokenKind::Name, "x");
        assert!(
            !strict_match(&named, &Cst::leaf(TokenKind::Name, "# x")).matched,
            "only empty placeholders skip comments"
        );
    }

    #[test]
    fn test_lenient_stops_when_template_is_exhausted() {
        let template = Pattern::chain(&EXPRESSION_CHAIN[..11], Pattern::capture("power"));
        let node = bare_name("Animal");

        let result = lenient_match(&template, &node);
        assert!(result.matched);
        let power = result.get("power").unwrap();
        assert!(power.is(Symbol::Power));

        // The same template is a full description under strict matching as well
        assert!(strict_match(&template, &node).matched);

        let short = Pattern::node(Symbol::Test, Vec::new());
        assert!(lenient_match(&short, &node).matched);
        assert!(!strict_match(&short, &node).matched);
    }

    #[test]
    fn test_lenient_longer_template_matches_only_through_captures() {
        let node = Cst::node(Symbol::Testlist, vec![name("a")]);
        let template = Pattern::node(
            Symbol::Testlist,
            vec![Pattern::capture("a"), Pattern::capture("b")],
        );
        let result = lenient_match(&template, &node);
        assert!(result.matched);
        assert_eq!(result.get("a"), Some(&name("a")));
        assert_eq!(result.get("b"), None, "nothing is left to bind");
        assert!(!strict_match(&template, &node).matched);

        let literal_tail = Pattern::node(
            Symbol::Testlist,
            vec![Pattern::capture("a"), Pattern::leaf(TokenKind::Comma, ",")],
        );
        assert!(!lenient_match(&literal_tail, &node).matched);
    }

    #[test]
    fn test_lenient_requires_every_named_position() {
        let node = Cst::node(Symbol::ExprStmt, vec![name("a"), name("b"), name("c")]);
        let template = Pattern::node(
            Symbol::ExprStmt,
            vec![Pattern::capture("first"), Pattern::leaf(TokenKind::Name, "z")],
        );
        let result = lenient_match(&template, &node);
        assert!(!result.matched, "a later mismatch fails the whole match");
        assert_eq!(result.get("first"), None);
    }

    #[test]
    fn test_symbol_mismatch_fails() {
        let template = Pattern::node(Symbol::Classdef, vec![Pattern::capture("x")]);
        let node = Cst::node(Symbol::Funcdef, vec![name("def")]);
        assert!(!strict_match(&template, &node).matched);
        assert!(!lenient_match(&template, &node).matched);
        assert!(!strict_match(&template, &name("Classdef")).matched);
    }

    #[test]
    fn test_token_capture_checks_kind() {
        let template = Pattern::token_capture(TokenKind::String, "doc");
        let string = Cst::leaf(TokenKind::String, "\"\"\"Doc.\"\"\"");
        assert_eq!(strict_match(&template, &string).get("doc"), Some(&string));
        assert!(!strict_match(&template, &name("doc")).matched);
        assert!(!strict_match(&template, &Cst::node(Symbol::Atom, vec![string])).matched);
    }

    #[test]
    fn test_bindings_accumulate_left_to_right() {
        let node = Cst::node(
            Symbol::Decorated,
            vec![Cst::node(Symbol::Decorators, Vec::new()), name("f")],
        );
        let template = Pattern::node(
            Symbol::Decorated,
            vec![Pattern::capture("decorators"), Pattern::capture("definition")],
        );
        let result = strict_match(&template, &node);
        assert_eq!(result.bindings.len(), 2);
        assert_eq!(result.get("definition"), Some(&name("f")));
    }
}
