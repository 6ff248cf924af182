//! Qualified names, scoped lookup and inherited configuration
//!
//! Every walk here goes up the parent chain iteratively; none of them recurse.

use super::tree::InfoRef;
use super::types::{InfoNode, NodeDetail, NodeId, CONSTRUCTOR_NAME};
use crate::config::{DEFAULT_DOCSTRING_FORMAT, DOCSTRING_FORMAT_KEY};

/// Names from the outermost definition down to `id`; the module contributes nothing
///
/// This is also the key under which the node's comment text is stored.
pub(crate) fn qualified_path(nodes: &[InfoNode], id: NodeId) -> Vec<String> {
    let mut path = Vec::new();
    let mut current = Some(id);
    while let Some(index) = current {
        let node = &nodes[index];
        if node.parent.is_some() {
            path.push(node.name.clone());
        }
        current = node.parent;
    }
    path.reverse();
    path
}

impl<'t> InfoRef<'t> {
    pub fn qualified_path(&self) -> Vec<String> {
        qualified_path(&self.tree.nodes, self.id)
    }

    /// Module name followed by the qualified path, joined with `.`
    pub fn full_name(&self) -> String {
        let module = self.tree.root().name().to_string();
        std::iter::once(module)
            .chain(self.qualified_path())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Resolve `name` from this scope outwards
    ///
    /// Each scope checks its classes, then its functions, before deferring to its parent.
    pub fn symbol_info(&self, name: &str) -> Option<InfoRef<'t>> {
        let mut scope = Some(*self);
        while let Some(current) = scope {
            if let Some(found) = current.class(name).or_else(|| current.function(name)) {
                return Some(found);
            }
            scope = current.parent();
        }
        None
    }

    /// Name to use when linking to this node
    ///
    /// A constructor is addressed by its owner's name.
    pub fn reference_target_name(&self) -> &'t str {
        let mut current = *self;
        while current.name() == CONSTRUCTOR_NAME {
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current.name()
    }

    /// Configuration value set on this node or the nearest ancestor that has one
    pub fn config_value(&self, key: &str) -> Option<&'t str> {
        let mut scope = Some(*self);
        while let Some(current) = scope {
            if let NodeDetail::Module { config, .. } = &current.node().detail {
                if let Some(value) = config.get(key) {
                    return Some(value.as_str());
                }
            }
            scope = current.parent();
        }
        None
    }

    pub fn docstring_format(&self) -> &'t str {
        self.config_value(DOCSTRING_FORMAT_KEY)
            .unwrap_or(DEFAULT_DOCSTRING_FORMAT)
    }
}
