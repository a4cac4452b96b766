//! The code-generation engine.
//!
//! Validation runs in full before any template is rendered: a malformed or
//! unresolvable type reference, a missing rate, or an identifier collision
//! aborts generation with nothing emitted, so partial artifacts are never
//! produced. Generation itself is a single pass in endpoint input order, and
//! re-running it over unchanged inputs yields a byte-identical artifact.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::CodegenError;
use super::endpoint::{EndpointSpec, Role};
use super::templates::TemplateSet;
use crate::naming::TypeRef;
use crate::schema::PackageGraph;

/// Everything one generation run produces.
///
/// The five buckets are independently ordered so an external renderer can
/// place each in a different region of the output source. Within a bucket,
/// entries follow endpoint input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    /// Handler and message variable declarations, all roles interleaved in
    /// endpoint order
    pub variable_declarations: Vec<String>,
    /// Per-role initialization blocks
    pub init_blocks: BTreeMap<Role, Vec<String>>,
    /// Per-role executor registrations
    pub registration_blocks: BTreeMap<Role, Vec<String>>,
    /// Per-role callback bodies
    pub callback_blocks: BTreeMap<Role, Vec<String>>,
    /// Per-role statements for the spin loop (publish, request-send,
    /// response-take)
    pub action_statements: BTreeMap<Role, Vec<String>>,
    /// Deduplicated, sorted header include paths
    pub required_headers: BTreeSet<String>,
    /// Mangled type symbol → variables declared with that type
    pub type_usage_index: BTreeMap<String, Vec<String>>,
}

impl GeneratedArtifact {
    fn bucket<'a>(map: &'a BTreeMap<Role, Vec<String>>, roles: &[Role]) -> Vec<&'a str> {
        roles
            .iter()
            .filter_map(|role| map.get(role))
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Initialization blocks in renderer order (pub, sub, srv, cli, timer)
    #[must_use]
    pub fn ordered_inits(&self) -> Vec<&str> {
        Self::bucket(&self.init_blocks, &[
            Role::Publisher,
            Role::Subscriber,
            Role::Service,
            Role::Client,
            Role::Timer,
        ])
    }

    /// Registrations in renderer order (sub, srv, timer)
    #[must_use]
    pub fn ordered_registrations(&self) -> Vec<&str> {
        Self::bucket(&self.registration_blocks, &[
            Role::Subscriber,
            Role::Service,
            Role::Timer,
        ])
    }

    /// Callback bodies in renderer order (sub, srv, timer)
    #[must_use]
    pub fn ordered_callbacks(&self) -> Vec<&str> {
        Self::bucket(&self.callback_blocks, &[
            Role::Subscriber,
            Role::Service,
            Role::Timer,
        ])
    }

    /// Spin-loop statements in renderer order (publishers, then clients)
    #[must_use]
    pub fn ordered_statements(&self) -> Vec<&str> {
        Self::bucket(&self.action_statements, &[Role::Publisher, Role::Client])
    }
}

/// Identifiers derived from one endpoint, validated before generation
struct DerivedNames {
    handler: String,
    message_var: Option<String>,
    request_var: Option<String>,
    response_var: Option<String>,
    callback: Option<String>,
    type_ref: Option<TypeRef>,
}

impl DerivedNames {
    fn derive(endpoint: &EndpointSpec, type_ref: Option<TypeRef>) -> Self {
        let name = &endpoint.local_name;
        let (message_var, request_var, response_var) = match endpoint.role {
            Role::Publisher | Role::Subscriber => (Some(format!("{name}_msg")), None, None),
            Role::Service | Role::Client => (
                None,
                Some(format!("{name}_request")),
                Some(format!("{name}_response")),
            ),
            Role::Timer => (None, None, None),
        };
        let callback = match endpoint.role {
            Role::Subscriber => Some(format!("{name}_callback")),
            Role::Service => Some(format!("{name}_srv_callback")),
            Role::Timer => Some(format!("{name}_timer_callback")),
            Role::Publisher | Role::Client => None,
        };

        DerivedNames {
            handler: endpoint.handler(),
            message_var,
            request_var,
            response_var,
            callback,
            type_ref,
        }
    }

    fn identifiers(&self) -> impl Iterator<Item = &String> {
        std::iter::once(&self.handler)
            .chain(self.message_var.as_ref())
            .chain(self.request_var.as_ref())
            .chain(self.response_var.as_ref())
            .chain(self.callback.as_ref())
    }
}

/// The engine: borrows a frozen graph and a template set, consumes endpoint
/// lists, produces artifacts.
///
/// ```
/// use urosgen::codegen::{CodeGenEngine, EndpointSpec, Reliability, TemplateSet};
/// use urosgen::schema::{PackageGraph, SchemaParser};
///
/// let mut graph = PackageGraph::new();
/// let block = SchemaParser::new().parse_str("float64 data\n")?;
/// graph
///     .package_mut("std_msgs")
///     .messages
///     .insert("Float64".to_string(), block.fields);
///
/// let templates = TemplateSet::default();
/// let engine = CodeGenEngine::new(&graph, &templates);
/// let artifact = engine.generate(&[EndpointSpec::publisher(
///     "level",
///     "std_msgs/msg/Float64",
///     Reliability::Reliable,
/// )])?;
/// assert!(artifact.required_headers.contains("std_msgs/msg/float64.h"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct CodeGenEngine<'a> {
    graph: &'a PackageGraph,
    templates: &'a TemplateSet,
}

impl<'a> CodeGenEngine<'a> {
    /// Create an engine over a frozen graph and template set
    #[must_use]
    pub fn new(graph: &'a PackageGraph, templates: &'a TemplateSet) -> Self {
        CodeGenEngine { graph, templates }
    }

    /// Validate every endpoint, then emit the artifact.
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError`] if any type reference is malformed or does
    /// not resolve against the graph, a timer has no rate, derived
    /// identifiers collide, or the template set lacks a required template.
    /// All validation happens before anything is rendered.
    pub fn generate(&self, endpoints: &[EndpointSpec]) -> Result<GeneratedArtifact, CodegenError> {
        let derived = self.validate(endpoints)?;

        let mut artifact = GeneratedArtifact::default();
        for (endpoint, names) in endpoints.iter().zip(&derived) {
            self.emit(endpoint, names, &mut artifact)?;
        }
        Ok(artifact)
    }

    /// Validate-all-then-generate: resolve references, check rates, and
    /// detect identifier collisions across the whole run
    fn validate(&self, endpoints: &[EndpointSpec]) -> Result<Vec<DerivedNames>, CodegenError> {
        let mut derived = Vec::with_capacity(endpoints.len());
        let mut seen = BTreeSet::new();

        for endpoint in endpoints {
            let type_ref = match endpoint.role.expected_category() {
                Some(expected) => Some(self.resolve_ref(endpoint, expected)?),
                None => {
                    if endpoint.rate_hz.is_none() {
                        return Err(CodegenError::MissingRate {
                            name: endpoint.local_name.clone(),
                        });
                    }
                    None
                }
            };

            let names = DerivedNames::derive(endpoint, type_ref);
            for identifier in names.identifiers() {
                if !seen.insert(identifier.clone()) {
                    return Err(CodegenError::DuplicateIdentifier {
                        identifier: identifier.clone(),
                    });
                }
            }
            derived.push(names);
        }

        Ok(derived)
    }

    fn resolve_ref(
        &self,
        endpoint: &EndpointSpec,
        expected: &'static str,
    ) -> Result<TypeRef, CodegenError> {
        let raw = endpoint
            .type_ref
            .as_deref()
            .ok_or_else(|| CodegenError::MissingTypeRef {
                name: endpoint.local_name.clone(),
                role: endpoint.role,
            })?;
        let type_ref: TypeRef = raw.parse()?;

        let known = type_ref.category == expected
            && self
                .graph
                .contains(&type_ref.package, &type_ref.category, &type_ref.name);
        if !known {
            return Err(CodegenError::UnknownType {
                name: endpoint.local_name.clone(),
                role: endpoint.role,
                reference: raw.to_string(),
                expected,
            });
        }

        Ok(type_ref)
    }

    /// Render one endpoint into the artifact buckets
    fn emit(
        &self,
        endpoint: &EndpointSpec,
        names: &DerivedNames,
        artifact: &mut GeneratedArtifact,
    ) -> Result<(), CodegenError> {
        let role = endpoint.role;
        let symbol = names.type_ref.as_ref().map(TypeRef::symbol);

        let mut mapping = BTreeMap::new();
        mapping.insert("HandlerObject".to_string(), names.handler.clone());

        if let (Some(type_ref), Some(symbol)) = (&names.type_ref, &symbol) {
            artifact.required_headers.insert(type_ref.header_path());
            match role {
                Role::Publisher | Role::Subscriber => {
                    mapping.insert("TopicName".to_string(), endpoint.local_name.clone());
                    mapping.insert("TopicType".to_string(), symbol.clone());
                    mapping.insert("TopicTypeComa".to_string(), type_ref.comma_form());
                    mapping.insert(
                        "Reliability".to_string(),
                        endpoint.qos.unwrap_or_default().template_value().to_string(),
                    );
                }
                Role::Service | Role::Client => {
                    mapping.insert("ServiceName".to_string(), endpoint.local_name.clone());
                    mapping.insert("ServiceType".to_string(), symbol.clone());
                    mapping.insert("ServiceTypeComa".to_string(), type_ref.comma_form());
                }
                Role::Timer => {}
            }
        }
        if let Some(message_var) = &names.message_var {
            mapping.insert("MsgName".to_string(), message_var.clone());
        }
        if let Some(request_var) = &names.request_var {
            mapping.insert("RequestMsg".to_string(), request_var.clone());
        }
        if let Some(response_var) = &names.response_var {
            mapping.insert("ResponseMsg".to_string(), response_var.clone());
        }
        if let Some(callback) = &names.callback {
            mapping.insert("CallBackName".to_string(), callback.clone());
        }
        if let Some(rate) = endpoint.rate_hz {
            mapping.insert("TimerRate".to_string(), format!("{rate}"));
        }

        Self::emit_declarations(role, names, symbol.as_deref(), artifact);

        let render = |artifact_bucket: &mut BTreeMap<Role, Vec<String>>,
                      template_name: &str|
         -> Result<(), CodegenError> {
            let text = self.templates.render(template_name, &mapping).ok_or_else(|| {
                CodegenError::MissingTemplate {
                    name: template_name.to_string(),
                }
            })?;
            artifact_bucket.entry(role).or_default().push(text);
            Ok(())
        };

        match role {
            Role::Publisher => {
                render(&mut artifact.init_blocks, "rcl_publisher_t")?;
                render(&mut artifact.action_statements, "publish_data")?;
            }
            Role::Subscriber => {
                render(&mut artifact.init_blocks, "rcl_subscription_t")?;
                render(&mut artifact.registration_blocks, "handler_subscription")?;
                render(&mut artifact.callback_blocks, "call_back_subscription")?;
            }
            Role::Service => {
                render(&mut artifact.init_blocks, "rcl_service_t")?;
                render(&mut artifact.registration_blocks, "handler_service")?;
                render(&mut artifact.callback_blocks, "call_back_service")?;
            }
            Role::Client => {
                render(&mut artifact.init_blocks, "rcl_client_t")?;
                render(&mut artifact.action_statements, "client_send")?;
                render(&mut artifact.action_statements, "client_take")?;
            }
            Role::Timer => {
                render(&mut artifact.init_blocks, "rcl_timer_t")?;
                render(&mut artifact.registration_blocks, "handler_timer")?;
                render(&mut artifact.callback_blocks, "call_back_timer")?;
            }
        }

        Ok(())
    }

    fn emit_declarations(
        role: Role,
        names: &DerivedNames,
        symbol: Option<&str>,
        artifact: &mut GeneratedArtifact,
    ) {
        artifact
            .variable_declarations
            .push(format!("{:<18} {};", role.handler_type(), names.handler));

        let Some(symbol) = symbol else {
            return;
        };
        let usage = artifact
            .type_usage_index
            .entry(symbol.to_string())
            .or_default();

        if let Some(message_var) = &names.message_var {
            artifact
                .variable_declarations
                .push(format!("{symbol} {message_var};"));
            usage.push(message_var.clone());
        }
        if let (Some(request_var), Some(response_var)) = (&names.request_var, &names.response_var) {
            artifact
                .variable_declarations
                .push(format!("{symbol}_Request {request_var};"));
            artifact
                .variable_declarations
                .push(format!("{symbol}_Response {response_var};"));
            usage.push(request_var.clone());
            usage.push(response_var.clone());
        }
    }
}
