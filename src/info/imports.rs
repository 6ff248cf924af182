/// Import table of a module
///
/// `import a.b` records a straight import of `a.b`. `from a import x, y` records the symbols
/// `x` and `y` under `a`; a wildcard import records `*`. Both forms are deduplicated.
use serde::Serialize;
use tracing::trace;

use crate::cst::render::to_source_string;
use crate::cst::{Cst, Symbol, TokenKind};

/// Marker recorded for `from module import *`
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportTable {
    straight: Vec<String>,
    named: Vec<(String, Vec<String>)>,
}

/// One row of [`ImportTable::items`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportEntry<'a> {
    pub module: &'a str,
    /// `None` for straight imports
    pub symbols: Option<&'a [String]>,
}

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, module: &str) {
        if !self.straight.iter().any(|known| known == module) {
            self.straight.push(module.to_string());
        }
    }

    pub fn add_symbol(&mut self, module: &str, symbol: &str) {
        let index = match self.named.iter().position(|(known, _)| known == module) {
            Some(index) => index,
            None => {
                self.named.push((module.to_string(), Vec::new()));
                self.named.len() - 1
            }
        };
        let symbols = &mut self.named[index].1;
        if !symbols.iter().any(|known| known == symbol) {
            symbols.push(symbol.to_string());
        }
    }

    /// Entries sorted by module name; a module imported both ways lists its straight entry first
    pub fn items(&self) -> Vec<ImportEntry<'_>> {
        let mut items: Vec<ImportEntry<'_>> = self
            .straight
            .iter()
            .map(|module| ImportEntry {
                module,
                symbols: None,
            })
            .chain(self.named.iter().map(|(module, symbols)| ImportEntry {
                module,
                symbols: Some(symbols.as_slice()),
            }))
            .collect();
        items.sort_by(|a, b| a.module.cmp(b.module));
        items
    }

    /// Symbols imported with `from module import ...`, in first-seen order
    pub fn imported_symbols(&self, module: &str) -> Option<&[String]> {
        self.named
            .iter()
            .find(|(known, _)| known == module)
            .map(|(_, symbols)| symbols.as_slice())
    }

    pub fn contains_module(&self, module: &str) -> bool {
        self.straight.iter().any(|known| known == module)
            || self.named.iter().any(|(known, _)| known == module)
    }

    pub fn len(&self) -> usize {
        self.straight.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.straight.is_empty() && self.named.is_empty()
    }
}

/// Record one `import_stmt` node
pub fn record_import(import_stmt: &Cst, table: &mut ImportTable) {
    let children = import_stmt.children();
    match children.first() {
        Some(first) if first.is_token(TokenKind::Name, "import") => {
            for name in &children[1..] {
                let dotted = if name.is(Symbol::DottedAsName) {
                    name.children().first()
                } else {
                    Some(name)
                };
                if let Some(dotted) = dotted.filter(|d| d.is(Symbol::DottedName)) {
                    table.add_module(&to_source_string(dotted, ""));
                }
            }
        }
        Some(first) if first.is_token(TokenKind::Name, "from") => {
            let Some(module) = children.get(1) else {
                return;
            };
            let module = to_source_string(module, "");
            let Some(import_at) = children
                .iter()
                .position(|child| child.is_token(TokenKind::Name, "import"))
            else {
                return;
            };

            for name in &children[import_at + 1..] {
                match name {
                    Cst::Leaf {
                        token: TokenKind::Name,
                        text,
                    } => table.add_symbol(&module, text),
                    Cst::Leaf {
                        token: TokenKind::Star,
                        ..
                    } => table.add_symbol(&module, WILDCARD),
                    Cst::Node {
                        symbol: Symbol::ImportAsName,
                        children,
                    } => {
                        if let Some(original) = children.first().and_then(Cst::text) {
                            table.add_symbol(&module, original);
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => trace!("Unrecognized import statement shape"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::parse_python;
    use std::path::Path;

    fn table_for(source: &str) -> ImportTable {
        let tree = parse_python(source, Path::new("imports.py")).unwrap();
        let mut table = ImportTable::new();
        for import_stmt in tree.collect(Symbol::ImportStmt, &[]) {
            record_import(import_stmt, &mut table);
        }
        table
    }

    #[test]
    fn test_from_import_symbols() {
        let table = table_for("from os import path, sep\n");
        let items = table.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].module, "os");
        assert_eq!(
            items[0].symbols,
            Some(["path".to_string(), "sep".to_string()].as_slice())
        );
    }

    #[test]
    fn test_straight_imports_keep_full_dotted_name() {
        let table = table_for("import os.path\nimport collections as coll, sys\n");
        let modules: Vec<&str> = table.items().iter().map(|entry| entry.module).collect();
        assert_eq!(modules, vec!["collections", "os.path", "sys"]);
        assert!(table.items().iter().all(|entry| entry.symbols.is_none()));
    }

    #[test]
    fn test_symbols_are_not_duplicated() {
        let table = table_for("from typing import Dict, List as TypedList\nfrom typing import Dict\n");
        assert_eq!(
            table.imported_symbols("typing"),
            Some(["Dict".to_string(), "List".to_string()].as_slice())
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_wildcard_and_relative_imports() {
        let table = table_for("from ..base import *\nfrom . import sibling\n");
        assert_eq!(
            table.imported_symbols("..base"),
            Some([WILDCARD.to_string()].as_slice())
        );
        assert_eq!(
            table.imported_symbols("."),
            Some(["sibling".to_string()].as_slice())
        );
    }

    #[test]
    fn test_module_imported_both_ways() {
        let mut table = ImportTable::new();
        table.add_symbol("os", "path");
        table.add_module("os");
        table.add_module("abc");

        let items = table.items();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].module, "abc");
        assert_eq!((items[1].module, items[1].symbols.is_none()), ("os", true));
        assert_eq!((items[2].module, items[2].symbols.is_some()), ("os", true));
        assert!(table.contains_module("os"));
    }
}
