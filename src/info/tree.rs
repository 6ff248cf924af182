/// Arena-backed info tree and its read handle
///
/// All nodes of one file live in a single `Vec`; node 0 is the module. Parent links and the
/// per-node class/function maps are indices into that arena, so the tree holds no reference
/// cycles and is freely shareable once built.
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use super::docstrings::summary_line;
use super::imports::ImportTable;
use super::types::{InfoNode, NodeDetail, NodeId, NodeKind, Parameter, RaisedException};

/// Root of the arena
pub const ROOT: NodeId = 0;

#[derive(Debug, Clone, Serialize)]
pub struct InfoTree {
    pub(crate) file: PathBuf,
    pub(crate) nodes: Vec<InfoNode>,
}

impl InfoTree {
    /// The module node
    pub fn root(&self) -> InfoRef<'_> {
        InfoRef {
            tree: self,
            id: ROOT,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Handle for an arena index, `None` when out of range
    pub fn get(&self, id: NodeId) -> Option<InfoRef<'_>> {
        (id < self.nodes.len()).then_some(InfoRef { tree: self, id })
    }

    /// Nodes reachable from the module; superseded redefinitions are not kept
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Read-only view of one node
#[derive(Debug, Clone, Copy)]
pub struct InfoRef<'t> {
    pub(crate) tree: &'t InfoTree,
    pub(crate) id: NodeId,
}

impl PartialEq for InfoRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for InfoRef<'_> {}

impl<'t> InfoRef<'t> {
    pub(crate) fn node(&self) -> &'t InfoNode {
        &self.tree.nodes[self.id]
    }

    fn at(&self, id: NodeId) -> InfoRef<'t> {
        InfoRef {
            tree: self.tree,
            id,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.node().kind
    }

    pub fn name(&self) -> &'t str {
        &self.node().name
    }

    pub fn parent(&self) -> Option<InfoRef<'t>> {
        self.node().parent.map(|id| self.at(id))
    }

    pub fn owning_file(&self) -> &'t Path {
        &self.tree.file
    }

    pub fn docstring(&self) -> &'t str {
        &self.node().docstring
    }

    pub fn comment_text(&self) -> &'t str {
        &self.node().comment_text
    }

    /// Docstring, a blank line, then the comment text; the separator is always present
    pub fn doc_text(&self) -> String {
        format!("{}\n\n{}", self.docstring(), self.comment_text())
    }

    pub fn summary(&self) -> String {
        summary_line(&self.doc_text())
    }

    /// Nested class names, sorted
    pub fn class_names(&self) -> Vec<&'t str> {
        let mut names: Vec<&str> = self.node().classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Nested function names, sorted
    pub fn function_names(&self) -> Vec<&'t str> {
        let mut names: Vec<&str> = self.node().functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn class(&self, name: &str) -> Option<InfoRef<'t>> {
        self.node().classes.get(name).map(|id| self.at(*id))
    }

    pub fn function(&self, name: &str) -> Option<InfoRef<'t>> {
        self.node().functions.get(name).map(|id| self.at(*id))
    }

    /// Empty unless this is a class
    pub fn base_class_names(&self) -> &'t [String] {
        match &self.node().detail {
            NodeDetail::Class {
                base_class_names, ..
            } => base_class_names,
            _ => &[],
        }
    }

    /// Empty unless this is a class
    pub fn class_member_names(&self) -> &'t [String] {
        match &self.node().detail {
            NodeDetail::Class { member_names, .. } => member_names,
            _ => &[],
        }
    }

    /// `None` unless this is the module
    pub fn imports(&self) -> Option<&'t ImportTable> {
        match &self.node().detail {
            NodeDetail::Module { imports, .. } => Some(imports),
            _ => None,
        }
    }

    pub fn parameters(&self) -> &'t [Parameter] {
        match &self.node().detail {
            NodeDetail::Function { parameters, .. } => parameters,
            _ => &[],
        }
    }

    pub fn exceptions(&self) -> &'t [RaisedException] {
        match &self.node().detail {
            NodeDetail::Function { exceptions, .. } => exceptions,
            _ => &[],
        }
    }

    pub fn decorators(&self) -> &'t [String] {
        &self.node().decorators
    }

    pub fn is_async(&self) -> bool {
        matches!(
            self.node().detail,
            NodeDetail::Function { is_async: true, .. }
        )
    }
}
