/// Fixed templates used while building the info tree
///
/// Each template names its captures in the doc comment. Which matcher a template is meant
/// for matters: the docstring, import and definition shapes are strict, the base-class,
/// class-member and raise shapes are lenient.
use once_cell::sync::Lazy;

use super::Pattern;
use crate::cst::{Symbol, TokenKind, EXPRESSION_CHAIN};

/// Productions from `test` down to `factor`; the next level is `power`
const TO_FACTOR: &[Symbol] = &[
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
];

/// `test` reducing to an atom made of one leaf of `token`, captured as `name`
fn bare_atom(token: TokenKind, name: &str) -> Pattern {
    Pattern::chain(
        &EXPRESSION_CHAIN,
        Pattern::node(Symbol::Atom, vec![Pattern::token_capture(token, name)]),
    )
}

fn docstring_simple_stmt() -> Pattern {
    Pattern::node(
        Symbol::SimpleStmt,
        vec![
            Pattern::node(
                Symbol::SmallStmt,
                vec![Pattern::node(
                    Symbol::ExprStmt,
                    vec![Pattern::node(
                        Symbol::Testlist,
                        vec![bare_atom(TokenKind::String, "docstring")],
                    )],
                )],
            ),
            Pattern::leaf(TokenKind::Newline, ""),
        ],
    )
}

/// Any compound statement. Captures `compound`.
pub static COMPOUND_STMT: Lazy<Pattern> = Lazy::new(|| {
    Pattern::node(
        Symbol::Stmt,
        vec![Pattern::node(
            Symbol::CompoundStmt,
            vec![Pattern::capture("compound")],
        )],
    )
});

/// A statement that is exactly one string literal. Captures `docstring` (the STRING leaf).
pub static DOCSTRING_STMT: Lazy<Pattern> =
    Lazy::new(|| Pattern::node(Symbol::Stmt, vec![docstring_simple_stmt()]));

/// The one-line body form of [`DOCSTRING_STMT`], as in `def f(): "doc"`.
pub static DOCSTRING_SIMPLE_STMT: Lazy<Pattern> = Lazy::new(docstring_simple_stmt);

/// A simple statement holding a single small statement. Captures `small`.
///
/// The captured node is an import when tagged `ImportStmt`.
pub static SMALL_STMT: Lazy<Pattern> = Lazy::new(|| {
    Pattern::node(
        Symbol::Stmt,
        vec![Pattern::node(
            Symbol::SimpleStmt,
            vec![
                Pattern::node(Symbol::SmallStmt, vec![Pattern::capture("small")]),
                Pattern::leaf(TokenKind::Newline, ""),
            ],
        )],
    )
});

/// A base class expression reducing to a single power node. Captures `power`.
pub static BASE_CLASS_NAME: Lazy<Pattern> =
    Lazy::new(|| Pattern::chain(TO_FACTOR, Pattern::capture("power")));

/// An assignment statement `target = ...`. Captures `target` (the left testlist).
pub static CLASS_MEMBER_STMT: Lazy<Pattern> = Lazy::new(|| {
    Pattern::chain(
        &[Symbol::Stmt, Symbol::SimpleStmt, Symbol::SmallStmt],
        Pattern::node(
            Symbol::ExprStmt,
            vec![
                Pattern::capture("target"),
                Pattern::leaf(TokenKind::Equal, "="),
            ],
        ),
    )
});

/// An assignment target that is one bare name. Captures `member_name`.
pub static MEMBER_NAME: Lazy<Pattern> = Lazy::new(|| {
    Pattern::node(
        Symbol::Testlist,
        vec![bare_atom(TokenKind::Name, "member_name")],
    )
});

/// A decorated class or function. Captures `decorators` and `definition`.
pub static DECORATED_DEFINITION: Lazy<Pattern> = Lazy::new(|| {
    Pattern::node(
        Symbol::Decorated,
        vec![
            Pattern::capture("decorators"),
            Pattern::capture("definition"),
        ],
    )
});

/// `async def`. Captures `definition`.
pub static ASYNC_DEFINITION: Lazy<Pattern> = Lazy::new(|| {
    Pattern::node(
        Symbol::AsyncStmt,
        vec![
            Pattern::leaf(TokenKind::Name, "async"),
            Pattern::capture("definition"),
        ],
    )
});

/// A raised string literal, as in old-style `raise "Error"`. Captures `exception`.
pub static RAISED_STRING: Lazy<Pattern> =
    Lazy::new(|| bare_atom(TokenKind::String, "exception"));

/// A raised expression headed by a power node. Captures `power`.
pub static RAISED_NAME: Lazy<Pattern> =
    Lazy::new(|| Pattern::chain(TO_FACTOR, Pattern::capture("power")));
