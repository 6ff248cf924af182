//! Info-node hierarchy
//!
//! Modules, classes and functions extracted from one source file, with docstrings, associated
//! comment text, base classes, class members, imports and parameters. Nodes are stored in an
//! arena ([`InfoTree`]) and read through [`InfoRef`] handles.
//!
//! Module layout:
//! - `types.rs`: node records and per-kind details
//! - `builder.rs`: the top-down walk that creates nodes
//! - `tree.rs`: the arena and the read accessors
//! - `lookup.rs`: qualified names, scoped lookup, inherited configuration
//! - `classes.rs`, `functions.rs`, `imports.rs`: per-kind extraction
//! - `docstrings.rs`: string literal decoding

pub mod builder;
pub mod classes;
pub mod docstrings;
pub mod functions;
pub mod imports;
pub mod lookup;
pub mod tree;
pub mod types;

pub use builder::InfoBuilder;
pub use imports::{ImportEntry, ImportTable};
pub use tree::{InfoRef, InfoTree};
pub use types::{
    DefaultKind, ExceptionKind, InfoNode, NodeDetail, NodeId, NodeKind, Parameter,
    RaisedException, CONSTRUCTOR_NAME,
};
