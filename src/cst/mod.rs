//! Concrete syntax tree for Python sources
//!
//! The tree mirrors the classic nested Python grammar: every interior node is tagged with the
//! production that produced it and every leaf carries its token kind and literal text. The
//! analysis engine only ever reads a `Cst`; it is built once by the front end in `lower.rs`.
//!
//! Module layout:
//! - `lower.rs`: tree-sitter parse tree -> `Cst`
//! - `render.rs`: `Cst` -> display text

pub mod lower;
pub mod render;

use serde::Serialize;

pub use lower::parse_python;
pub use render::to_source_string;

/// Grammar productions that can tag an interior node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbol {
    FileInput,
    Stmt,
    SimpleStmt,
    SmallStmt,
    ExprStmt,
    Testlist,
    Test,
    AndTest,
    NotTest,
    Comparison,
    Expr,
    XorExpr,
    AndExpr,
    ShiftExpr,
    ArithExpr,
    Term,
    Factor,
    Power,
    Atom,
    Trailer,
    Arglist,
    Argument,
    Subscript,
    CompoundStmt,
    Funcdef,
    AsyncStmt,
    Classdef,
    Decorated,
    Decorators,
    Decorator,
    Parameters,
    Varargslist,
    Fpdef,
    Suite,
    ImportStmt,
    DottedAsName,
    DottedName,
    ImportAsName,
    RaiseStmt,
    ReturnStmt,
    PassStmt,
    OtherStmt,
    IfStmt,
    WhileStmt,
    ForStmt,
    TryStmt,
    WithStmt,
    MatchStmt,
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Token kinds carried by leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Name,
    Number,
    String,
    Newline,
    Indent,
    Dedent,
    EndMarker,
    Lpar,
    Rpar,
    Lsqb,
    Rsqb,
    Colon,
    Comma,
    Dot,
    Equal,
    Star,
    DoubleStar,
    At,
    Rarrow,
    Op,
}

/// A node of the concrete syntax tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cst {
    Node { symbol: Symbol, children: Vec<Cst> },
    Leaf { token: TokenKind, text: String },
}

impl Cst {
    pub fn node(symbol: Symbol, children: Vec<Cst>) -> Self {
        Cst::Node { symbol, children }
    }

    pub fn leaf(token: TokenKind, text: impl Into<String>) -> Self {
        Cst::Leaf {
            token,
            text: text.into(),
        }
    }

    /// Production tag, `None` for leaves
    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            Cst::Node { symbol, .. } => Some(*symbol),
            Cst::Leaf { .. } => None,
        }
    }

    /// Token kind, `None` for interior nodes
    pub fn token(&self) -> Option<TokenKind> {
        match self {
            Cst::Leaf { token, .. } => Some(*token),
            Cst::Node { .. } => None,
        }
    }

    /// Literal text of a leaf
    pub fn text(&self) -> Option<&str> {
        match self {
            Cst::Leaf { text, .. } => Some(text.as_str()),
            Cst::Node { .. } => None,
        }
    }

    /// Children of an interior node; leaves have none
    pub fn children(&self) -> &[Cst] {
        match self {
            Cst::Node { children, .. } => children,
            Cst::Leaf { .. } => &[],
        }
    }

    pub fn is(&self, symbol: Symbol) -> bool {
        self.symbol() == Some(symbol)
    }

    pub fn is_token(&self, token: TokenKind, text: &str) -> bool {
        matches!(self, Cst::Leaf { token: t, text: s } if *t == token && s == text)
    }

    /// Pre-order search for subtrees tagged `symbol`, without descending into `stop` tags.
    ///
    /// A matching subtree is not searched further, so nested matches are not reported twice.
    pub fn collect(&self, symbol: Symbol, stop: &[Symbol]) -> Vec<&Cst> {
        let mut found = Vec::new();
        let mut pending: Vec<&Cst> = self.children().iter().rev().collect();
        while let Some(node) = pending.pop() {
            let Some(tag) = node.symbol() else {
                continue;
            };
            if tag == symbol {
                found.push(node);
            } else if !stop.contains(&tag) {
                pending.extend(node.children().iter().rev());
            }
        }
        found
    }
}

/// Productions wrapping a bare value, outermost first
pub const EXPRESSION_CHAIN: [Symbol; 12] = [
    Symbol::Test,
    Symbol::AndTest,
    Symbol::NotTest,
    Symbol::Comparison,
    Symbol::Expr,
    Symbol::XorExpr,
    Symbol::AndExpr,
    Symbol::ShiftExpr,
    Symbol::ArithExpr,
    Symbol::Term,
    Symbol::Factor,
    Symbol::Power,
];
