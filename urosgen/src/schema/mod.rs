//! Interface Schema Parsing
//!
//! This module turns the line-oriented interface grammar (`#` comments,
//! `TYPE NAME=VALUE` constants, `<type-token> <field-name>` fields) into
//! ordered, typed field sets and the package graph built from them.

/// Error and diagnostic types
pub mod errors;
/// The resolved package graph
pub mod graph;
/// Field-block parsing
pub mod parser;
/// Core schema data structures
pub mod types;

pub use errors::{Diagnostic, SchemaError, SchemaResult};
pub use graph::{PackageGraph, PackageInterfaces};
pub use parser::{COMMENT_DELIMITER, ParseMode, ParsedBlock, SchemaParser};
pub use types::{
    ActionSchema, FieldSet, MessageSchema, PRIMITIVE_TYPES, ServiceSchema, TypeKind, TypeSpec,
};
