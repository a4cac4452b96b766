//! Code Generation Engine
//!
//! Consumes a validated endpoint list and a frozen [`PackageGraph`], emits
//! categorized code buckets plus the deduplicated header set. All validation
//! happens eagerly: nothing is rendered until every endpoint has passed, so a
//! failed run leaves no partial artifact behind. The one deliberate soft spot
//! is a template/mapping mismatch, which renders as an `<unknown:Key>` marker
//! inside the output instead of failing the run.
//!
//! [`PackageGraph`]: crate::schema::PackageGraph

/// Endpoint configuration model
pub mod endpoint;
/// Engine and artifact
pub mod engine;
/// Main-source rendering
pub mod render;
/// Template set and placeholder substitution
pub mod templates;

pub use endpoint::{EndpointSpec, Reliability, Role};
pub use engine::{CodeGenEngine, GeneratedArtifact};
pub use render::{DEFAULT_MAIN_TEMPLATE, RenderOptions, render_main_source};
pub use templates::{PLACEHOLDER_CLOSE, PLACEHOLDER_OPEN, TemplateError, TemplateSet, fill};

use thiserror::Error;

use crate::naming::MalformedTypeRef;

/// Fatal code-generation failures.
///
/// Every variant is raised during the validation pass, before any template
/// is rendered, except [`CodegenError::MissingTemplate`] which surfaces when
/// a custom template set does not cover a name the engine needs.
#[derive(Error, Debug)]
pub enum CodegenError {
    /// A type reference did not have exactly three segments
    #[error(transparent)]
    MalformedTypeRef(#[from] MalformedTypeRef),

    /// A type reference does not name a known interface of the role's
    /// category
    #[error(
        "Endpoint '{name}' ({role}): '{reference}' does not resolve to a known {expected} interface"
    )]
    UnknownType {
        /// Endpoint local name
        name: String,
        /// Endpoint role
        role: Role,
        /// The unresolvable reference
        reference: String,
        /// Category the role requires
        expected: &'static str,
    },

    /// A non-timer endpoint came without a type reference
    #[error("Endpoint '{name}' ({role}) requires a type reference")]
    MissingTypeRef {
        /// Endpoint local name
        name: String,
        /// Endpoint role
        role: Role,
    },

    /// A timer endpoint came without a rate
    #[error("Timer '{name}' requires a rate in Hz")]
    MissingRate {
        /// Endpoint local name
        name: String,
    },

    /// Two endpoints derived the same identifier
    #[error("Generated identifier '{identifier}' collides across endpoints")]
    DuplicateIdentifier {
        /// The colliding identifier
        identifier: String,
    },

    /// The template set lacks a template the engine renders
    #[error("Template set has no template named '{name}'")]
    MissingTemplate {
        /// The missing template name
        name: String,
    },

    /// A custom template set failed to load
    #[error(transparent)]
    Template(#[from] TemplateError),
}
