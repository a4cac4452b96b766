/// The resolved, immutable schema graph
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{ActionSchema, MessageSchema, ServiceSchema};

/// All interfaces of one package.
///
/// The `msg`/`srv`/`action` key names are part of the interchange format and
/// are always present, even when empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageInterfaces {
    /// Message schemas by name
    #[serde(rename = "msg")]
    pub messages: BTreeMap<String, MessageSchema>,
    /// Service schemas by name
    #[serde(rename = "srv")]
    pub services: BTreeMap<String, ServiceSchema>,
    /// Action schemas by name
    #[serde(rename = "action")]
    pub actions: BTreeMap<String, ActionSchema>,
}

/// The full package → interfaces mapping produced by a registry build.
///
/// Built once per run and read-only afterward. Serializes to the interchange
/// format: `package → {msg, srv, action}` with each field map keyed by field
/// name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageGraph(BTreeMap<String, PackageInterfaces>);

impl PackageGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Access a package's interfaces
    #[must_use]
    pub fn package(&self, name: &str) -> Option<&PackageInterfaces> {
        self.0.get(name)
    }

    /// Access a package's interfaces, creating the entry if absent
    pub fn package_mut(&mut self, name: &str) -> &mut PackageInterfaces {
        self.0.entry(name.to_string()).or_default()
    }

    /// Iterate packages in name order
    pub fn packages(&self) -> impl Iterator<Item = (&String, &PackageInterfaces)> {
        self.0.iter()
    }

    /// Look up a message schema
    #[must_use]
    pub fn message(&self, package: &str, name: &str) -> Option<&MessageSchema> {
        self.0.get(package)?.messages.get(name)
    }

    /// Look up a service schema
    #[must_use]
    pub fn service(&self, package: &str, name: &str) -> Option<&ServiceSchema> {
        self.0.get(package)?.services.get(name)
    }

    /// Look up an action schema
    #[must_use]
    pub fn action(&self, package: &str, name: &str) -> Option<&ActionSchema> {
        self.0.get(package)?.actions.get(name)
    }

    /// Check whether a `package/category/name` reference names an interface
    /// of the given category
    #[must_use]
    pub fn contains(&self, package: &str, category: &str, name: &str) -> bool {
        match category {
            "msg" => self.message(package, name).is_some(),
            "srv" => self.service(package, name).is_some(),
            "action" => self.action(package, name).is_some(),
            _ => false,
        }
    }

    /// Total number of message schemas
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.0.values().map(|p| p.messages.len()).sum()
    }

    /// Total number of service schemas
    #[must_use]
    pub fn service_count(&self) -> usize {
        self.0.values().map(|p| p.services.len()).sum()
    }

    /// Total number of action schemas
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.0.values().map(|p| p.actions.len()).sum()
    }
}
