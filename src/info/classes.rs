/// Class header and body extraction: base classes and class members
use tracing::trace;

use crate::cst::render::to_source_string;
use crate::cst::{Cst, Symbol};
use crate::pattern::templates::{BASE_CLASS_NAME, CLASS_MEMBER_STMT, MEMBER_NAME};
use crate::pattern::{lenient_match, strict_match};

/// Base class expressions in declaration order, duplicates kept
///
/// Only bases that reduce to a single power node (`Name`, `pkg.Name`, `Generic[T]`) are listed;
/// keyword arguments such as `metaclass=...` are not base classes.
pub fn base_class_names(classdef: &Cst) -> Vec<String> {
    let Some(bases) = classdef
        .children()
        .iter()
        .find(|child| child.is(Symbol::Testlist))
    else {
        return Vec::new();
    };

    bases
        .children()
        .iter()
        .filter(|base| base.is(Symbol::Test))
        .filter_map(|base| {
            let result = lenient_match(&BASE_CLASS_NAME, base);
            match result.get("power") {
                Some(power) => Some(to_source_string(power, " ")),
                None => {
                    trace!("Skipping base class expression {:?}", to_source_string(base, " "));
                    None
                }
            }
        })
        .collect()
}

/// Names bound by `name = value` statements directly in the class body, in declaration order
pub fn class_member_names(suite: &Cst) -> Vec<String> {
    suite
        .children()
        .iter()
        .filter(|statement| statement.is(Symbol::Stmt))
        .filter_map(|statement| lenient_match(&CLASS_MEMBER_STMT, statement).get("target"))
        .filter_map(|target| strict_match(&MEMBER_NAME, target).get("member_name"))
        .filter_map(Cst::text)
        .map(str::to_string)
        .collect()
}
