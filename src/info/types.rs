// Info-node records stored in the arena of an `InfoTree`

use std::collections::HashMap;

use serde::Serialize;

use super::imports::ImportTable;
use crate::config::ConfigValues;

/// Index of a node in its tree's arena
pub type NodeId = usize;

/// The name that makes a definition a constructor
pub const CONSTRUCTOR_NAME: &str = "__init__";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Module,
    Class,
    Function,
}

/// One module, class or function
///
/// `classes` and `functions` own the nested definitions; `parent` is a plain back-reference.
/// Functions never own classes: a class defined inside a function body is not documented.
#[derive(Debug, Clone, Serialize)]
pub struct InfoNode {
    pub kind: NodeKind,
    pub name: String,
    pub parent: Option<NodeId>,
    pub docstring: String,
    pub comment_text: String,
    pub classes: HashMap<String, NodeId>,
    pub functions: HashMap<String, NodeId>,
    /// Rendered decorator expressions, without the `@`
    pub decorators: Vec<String>,
    pub detail: NodeDetail,
}

/// Per-kind data
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeDetail {
    Module {
        imports: ImportTable,
        config: ConfigValues,
    },
    Class {
        base_class_names: Vec<String>,
        member_names: Vec<String>,
    },
    Function {
        parameters: Vec<Parameter>,
        exceptions: Vec<RaisedException>,
        is_async: bool,
    },
}

impl NodeDetail {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeDetail::Module { .. } => NodeKind::Module,
            NodeDetail::Class { .. } => NodeKind::Class,
            NodeDetail::Function { .. } => NodeKind::Function,
        }
    }
}

/// Shape of a parameter's default value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultKind {
    /// A string literal
    String,
    /// A bare or dotted name
    Name,
    Other,
}

/// A function parameter; star prefixes are kept in `name` (`*args`, `**kwargs`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub default: Option<String>,
    pub default_kind: Option<DefaultKind>,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            default_kind: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    /// `raise "message"`
    StringLiteral,
    /// `raise Name`, `raise pkg.Name(...)`
    Named,
    /// Anything else, rendered as written
    Expression,
}

/// An exception raised directly in a function body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaisedException {
    pub name: String,
    pub kind: ExceptionKind,
}
