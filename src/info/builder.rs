/// Top-down construction of an info tree from a parsed module
///
/// One pre-order walk per file. Each definition gets its docstring from the first statement of
/// its body, its comment text from the [`CommentTable`] under its qualified path, and is
/// inserted into its parent's class or function map (a redefinition replaces the earlier entry).
use std::collections::HashMap;
use std::path::PathBuf;

use tracing::trace;

use super::classes::{base_class_names, class_member_names};
use super::docstrings::decode_string_literal;
use super::functions::{parameters, raised_exceptions};
use super::imports::{record_import, ImportTable};
use super::lookup::qualified_path;
use super::tree::{InfoTree, ROOT};
use super::types::{InfoNode, NodeDetail, NodeId, NodeKind};
use crate::comments::CommentTable;
use crate::config::ConfigValues;
use crate::cst::render::to_source_string;
use crate::cst::{Cst, Symbol, TokenKind};
use crate::pattern::strict_match;
use crate::pattern::templates::{
    ASYNC_DEFINITION, COMPOUND_STMT, DECORATED_DEFINITION, DOCSTRING_SIMPLE_STMT, DOCSTRING_STMT,
};

pub struct InfoBuilder {
    file: PathBuf,
    comments: CommentTable,
    include_comments: bool,
    config: ConfigValues,
    nodes: Vec<InfoNode>,
}

impl InfoBuilder {
    pub fn new(file: impl Into<PathBuf>, comments: CommentTable) -> Self {
        Self {
            file: file.into(),
            comments,
            include_comments: true,
            config: ConfigValues::new(),
            nodes: Vec::new(),
        }
    }

    /// Configuration values stored on the module node
    pub fn with_config(mut self, config: ConfigValues) -> Self {
        self.config = config;
        self
    }

    pub fn include_comments(mut self, include: bool) -> Self {
        self.include_comments = include;
        self
    }

    /// Build the tree for a `file_input` node
    pub fn build_module(mut self, module_name: &str, file_input: &Cst) -> InfoTree {
        let mut imports = ImportTable::new();
        for import_stmt in file_input.collect(Symbol::ImportStmt, &[Symbol::Funcdef, Symbol::Classdef]) {
            record_import(import_stmt, &mut imports);
        }

        let config = std::mem::take(&mut self.config);
        let root = self.push_node(
            module_name,
            None,
            NodeDetail::Module { imports, config },
        );
        self.nodes[root].docstring = statement_docstring(file_input.children().first());
        self.nodes[root].comment_text = self.comment_for(root);

        self.walk_body(root, file_input.children());

        InfoTree {
            file: self.file,
            nodes: compact(self.nodes),
        }
    }

    fn push_node(&mut self, name: &str, parent: Option<NodeId>, detail: NodeDetail) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(InfoNode {
            kind: detail.kind(),
            name: name.to_string(),
            parent,
            docstring: String::new(),
            comment_text: String::new(),
            classes: HashMap::new(),
            functions: HashMap::new(),
            decorators: Vec::new(),
            detail,
        });
        id
    }

    fn comment_for(&self, id: NodeId) -> String {
        if !self.include_comments {
            return String::new();
        }
        let path = qualified_path(&self.nodes, id);
        self.comments.get(&path).unwrap_or_default().to_string()
    }

    fn walk_body(&mut self, parent: NodeId, statements: &[Cst]) {
        for statement in statements {
            if let Some(compound) = strict_match(&COMPOUND_STMT, statement).get("compound") {
                self.add_definition(parent, compound, Vec::new(), false);
            }
        }
    }

    fn add_definition(
        &mut self,
        parent: NodeId,
        definition: &Cst,
        decorators: Vec<String>,
        is_async: bool,
    ) {
        match definition.symbol() {
            Some(Symbol::Classdef) => {
                if self.nodes[parent].kind == NodeKind::Function {
                    trace!(
                        "Skipping class defined inside function {}",
                        self.nodes[parent].name
                    );
                    return;
                }
                self.add_class(parent, definition, decorators);
            }
            Some(Symbol::Funcdef) => self.add_function(parent, definition, decorators, is_async),
            Some(Symbol::Decorated) => {
                let result = strict_match(&DECORATED_DEFINITION, definition);
                if let (Some(list), Some(inner)) = (result.get("decorators"), result.get("definition")) {
                    self.add_definition(parent, inner, render_decorators(list), is_async);
                }
            }
            Some(Symbol::AsyncStmt) => {
                if let Some(inner) = strict_match(&ASYNC_DEFINITION, definition).get("definition") {
                    self.add_definition(parent, inner, decorators, true);
                }
            }
            other => trace!("Skipping compound statement {:?}", other),
        }
    }

    fn add_class(&mut self, parent: NodeId, classdef: &Cst, decorators: Vec<String>) {
        let Some((name, suite)) = definition_parts(classdef) else {
            trace!("Skipping class without a name or body");
            return;
        };

        let detail = NodeDetail::Class {
            base_class_names: base_class_names(classdef),
            member_names: class_member_names(suite),
        };
        let id = self.push_node(name, Some(parent), detail);
        self.nodes[parent].classes.insert(name.to_string(), id);
        self.finish_definition(id, suite, decorators);
    }

    fn add_function(
        &mut self,
        parent: NodeId,
        funcdef: &Cst,
        decorators: Vec<String>,
        is_async: bool,
    ) {
        let Some((name, suite)) = definition_parts(funcdef) else {
            trace!("Skipping function without a name or body");
            return;
        };

        let detail = NodeDetail::Function {
            parameters: parameters(funcdef),
            exceptions: raised_exceptions(suite),
            is_async,
        };
        let id = self.push_node(name, Some(parent), detail);
        self.nodes[parent].functions.insert(name.to_string(), id);
        self.finish_definition(id, suite, decorators);
    }

    fn finish_definition(&mut self, id: NodeId, suite: &Cst, decorators: Vec<String>) {
        self.nodes[id].decorators = decorators;
        self.nodes[id].docstring = suite_docstring(suite);
        self.nodes[id].comment_text = self.comment_for(id);
        self.walk_body(id, suite.children());
    }
}

/// Drop definitions superseded by a later one of the same name, along with their subtrees
///
/// Surviving nodes are renumbered breadth-first from the module, keeping creation order among
/// siblings, and every parent link and child map is rewritten to the new ids.
fn compact(nodes: Vec<InfoNode>) -> Vec<InfoNode> {
    let mut order = vec![ROOT];
    let mut cursor = 0;
    while let Some(&id) = order.get(cursor) {
        let node = &nodes[id];
        let mut children: Vec<NodeId> = node
            .classes
            .values()
            .chain(node.functions.values())
            .copied()
            .collect();
        children.sort_unstable();
        order.extend(children);
        cursor += 1;
    }
    if order.len() == nodes.len() {
        return nodes;
    }
    trace!("Dropping {} superseded info nodes", nodes.len() - order.len());

    let mut renumbered: Vec<Option<NodeId>> = vec![None; nodes.len()];
    for (new_id, &old_id) in order.iter().enumerate() {
        renumbered[old_id] = Some(new_id);
    }

    let mut slots: Vec<Option<InfoNode>> = nodes.into_iter().map(Some).collect();
    order
        .iter()
        .filter_map(|&old_id| slots[old_id].take())
        .map(|mut node| {
            node.parent = node.parent.and_then(|parent| renumbered[parent]);
            for child in node.classes.values_mut().chain(node.functions.values_mut()) {
                if let Some(new_id) = renumbered[*child] {
                    *child = new_id;
                }
            }
            node
        })
        .collect()
}

/// Name (second child) and body (last child) of a classdef or funcdef
fn definition_parts(definition: &Cst) -> Option<(&str, &Cst)> {
    let name = definition.children().get(1).and_then(Cst::text)?;
    let suite = definition
        .children()
        .last()
        .filter(|child| child.is(Symbol::Suite))?;
    Some((name, suite))
}

fn statement_docstring(statement: Option<&Cst>) -> String {
    statement
        .and_then(|statement| strict_match(&DOCSTRING_STMT, statement).get("docstring"))
        .and_then(Cst::text)
        .map(decode_string_literal)
        .unwrap_or_default()
}

fn suite_docstring(suite: &Cst) -> String {
    let children = suite.children();
    match children {
        [simple] if simple.is(Symbol::SimpleStmt) => strict_match(&DOCSTRING_SIMPLE_STMT, simple)
            .get("docstring")
            .and_then(Cst::text)
            .map(decode_string_literal)
            .unwrap_or_default(),
        _ => statement_docstring(children.iter().find(|child| child.is(Symbol::Stmt))),
    }
}

fn render_decorators(decorators: &Cst) -> Vec<String> {
    decorators
        .children()
        .iter()
        .filter(|decorator| decorator.is(Symbol::Decorator))
        .filter_map(|decorator| decorator.children().get(1))
        .filter(|expression| expression.token() != Some(TokenKind::Newline))
        .map(|expression| to_source_string(expression, " "))
        .collect()
}
