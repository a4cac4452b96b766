#![deny(
    unsafe_code,
    unused_must_use,
    unreachable_pub,
    rust_2018_idioms,
    missing_docs,
    clippy::pedantic
)]

//! # urosgen
//!
//! A library for turning ROS2 interface-definition files (`.msg`, `.srv`,
//! `.action`) into a typed schema graph and generating micro-ROS (rclc)
//! source fragments for a configured set of endpoints.
//!
//! ## Features
//!
//! - **Schema parsing**: the line-oriented interface grammar with comments,
//!   constants, bounded strings, and array specifiers
//! - **Two-phase registry**: forward references across files and packages
//!   resolve regardless of discovery order, with an explicit resolution
//!   policy for same-named types in different packages
//! - **Deterministic codegen**: per-endpoint declarations, init blocks,
//!   executor registrations, callback stubs, and spin-loop statements from a
//!   `<||Key||>` template set, byte-identical across re-runs
//! - **Stable naming**: `package/category/TypeName` references map to mangled
//!   C symbols and header include paths exactly as the generated support
//!   libraries lay them out
//!
//! ## Quick Start
//!
//! ```rust
//! use urosgen::codegen::{CodeGenEngine, EndpointSpec, Reliability, TemplateSet};
//! use urosgen::schema::{PackageGraph, SchemaParser};
//!
//! // Parse a message body and register it
//! let block = SchemaParser::new().parse_str("float64 x\nfloat64 y\nfloat64 z\n")?;
//! let mut graph = PackageGraph::new();
//! graph
//!     .package_mut("geometry_msgs")
//!     .messages
//!     .insert("Point".to_string(), block.fields);
//!
//! // Generate fragments for one publisher
//! let templates = TemplateSet::default();
//! let engine = CodeGenEngine::new(&graph, &templates);
//! let artifact = engine.generate(&[EndpointSpec::publisher(
//!     "position",
//!     "geometry_msgs/msg/Point",
//!     Reliability::Reliable,
//! )])?;
//!
//! assert!(artifact.required_headers.contains("geometry_msgs/msg/point.h"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Directory trees are scanned with the registry instead:
//!
//! ```rust,no_run
//! use urosgen::registry::InterfaceRegistry;
//!
//! let outcome = InterfaceRegistry::new()
//!     .root("/opt/ros/jazzy/share")
//!     .build()?;
//! for diagnostic in &outcome.diagnostics {
//!     eprintln!("{diagnostic}");
//! }
//! # Ok::<(), urosgen::schema::SchemaError>(())
//! ```
//!
//! ## Modules
//!
//! - [`schema`]: interface grammar parsing and the package graph
//! - [`registry`]: two-phase file scanning and nested-reference resolution
//! - [`naming`]: symbol mangling and header-path mapping
//! - [`codegen`]: the template engine, endpoint model, and artifact assembly

/// Code generation engine
pub mod codegen;
/// Name mangling for generated source
pub mod naming;
/// Interface file registry
pub mod registry;
/// Interface schema parsing
pub mod schema;

pub use codegen::{CodeGenEngine, CodegenError, EndpointSpec, GeneratedArtifact, TemplateSet};
pub use naming::{MalformedTypeRef, TypeRef};
pub use registry::{InterfaceRegistry, ResolutionPolicy, ScanOutcome, SchemaIndex};
pub use schema::{Diagnostic, FieldSet, PackageGraph, SchemaError, SchemaParser, TypeSpec};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
