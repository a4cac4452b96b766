//! Phase-1 message index and nested-reference resolution policies.
//!
//! The index is an explicit object built before any nested reference is
//! resolved, so resolution is independent of file-discovery order.

use std::collections::BTreeMap;

use crate::schema::MessageSchema;

/// Strategy for resolving an unqualified nested-type reference when more
/// than one package defines the short name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Exact-qualified match, then the referencing package, then the
    /// lexicographically first suffix match
    #[default]
    SamePackageFirst,
    /// Lexicographically first suffix match, regardless of the referencing
    /// package (compatibility mode)
    FirstMatchLexicographic,
}

/// Outcome of a nested-reference lookup
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<'a> {
    /// Qualified key (`package/TypeName`) of the selected schema
    pub key: &'a str,
    /// The selected schema
    pub schema: &'a MessageSchema,
    /// Qualified keys that also matched but were not selected
    pub rejected: Vec<String>,
}

/// Package-qualified index of message schemas, keyed `"<package>/<name>"`.
///
/// Keys iterate in lexicographic order, which is what makes the
/// first-match policies deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaIndex {
    entries: BTreeMap<String, MessageSchema>,
}

impl SchemaIndex {
    /// Create an empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a message schema under its qualified key
    pub fn insert(&mut self, package: &str, name: &str, schema: MessageSchema) {
        self.entries.insert(format!("{package}/{name}"), schema);
    }

    /// Look up a schema by qualified key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MessageSchema> {
        self.entries.get(key)
    }

    /// Number of indexed schemas
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a field's base type name against the index.
    ///
    /// A name containing `/` is treated as fully qualified and looked up
    /// exactly. An unqualified name is matched by `/<name>` suffix under the
    /// given policy; every other candidate is reported in `rejected` so the
    /// caller can surface the ambiguity.
    #[must_use]
    pub fn resolve(
        &self,
        base_name: &str,
        context_package: Option<&str>,
        policy: ResolutionPolicy,
    ) -> Option<Resolution<'_>> {
        if base_name.contains('/') {
            return self.entries.get_key_value(base_name).map(|(key, schema)| {
                Resolution {
                    key,
                    schema,
                    rejected: Vec::new(),
                }
            });
        }

        let suffix = format!("/{base_name}");
        let candidates: Vec<&str> = self
            .entries
            .keys()
            .filter(|key| key.ends_with(&suffix))
            .map(String::as_str)
            .collect();

        let same_package_key = context_package.map(|pkg| format!("{pkg}/{base_name}"));
        let chosen = match policy {
            ResolutionPolicy::SamePackageFirst => same_package_key
                .as_deref()
                .and_then(|key| candidates.iter().copied().find(|c| *c == key))
                .or_else(|| candidates.first().copied())?,
            ResolutionPolicy::FirstMatchLexicographic => candidates.first().copied()?,
        };

        let rejected = candidates
            .iter()
            .copied()
            .filter(|&candidate| candidate != chosen)
            .map(ToString::to_string)
            .collect();

        Some(Resolution {
            key: chosen,
            schema: &self.entries[chosen],
            rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSet, TypeSpec};

    fn schema_with(field: &str) -> MessageSchema {
        let mut fields = FieldSet::new();
        fields.insert(field, TypeSpec::from_token("int32"));
        fields
    }

    #[test]
    fn test_exact_qualified_lookup() {
        let mut index = SchemaIndex::new();
        index.insert("geometry_msgs", "Pose", schema_with("x"));

        let res = index
            .resolve("geometry_msgs/Pose", None, ResolutionPolicy::default())
            .unwrap();
        assert_eq!(res.key, "geometry_msgs/Pose");
        assert!(res.rejected.is_empty());

        assert!(
            index
                .resolve("other_msgs/Pose", None, ResolutionPolicy::default())
                .is_none()
        );
    }

    #[test]
    fn test_same_package_first() {
        let mut index = SchemaIndex::new();
        index.insert("alpha_msgs", "Pose", schema_with("a"));
        index.insert("zeta_msgs", "Pose", schema_with("z"));

        let res = index
            .resolve("Pose", Some("zeta_msgs"), ResolutionPolicy::SamePackageFirst)
            .unwrap();
        assert_eq!(res.key, "zeta_msgs/Pose");
        assert_eq!(res.rejected, ["alpha_msgs/Pose"]);
    }

    #[test]
    fn test_lexicographic_fallback() {
        let mut index = SchemaIndex::new();
        index.insert("alpha_msgs", "Pose", schema_with("a"));
        index.insert("zeta_msgs", "Pose", schema_with("z"));

        // Context package defines no Pose, fall back to lexicographic order
        let res = index
            .resolve("Pose", Some("my_msgs"), ResolutionPolicy::SamePackageFirst)
            .unwrap();
        assert_eq!(res.key, "alpha_msgs/Pose");

        let res = index
            .resolve(
                "Pose",
                Some("zeta_msgs"),
                ResolutionPolicy::FirstMatchLexicographic,
            )
            .unwrap();
        assert_eq!(res.key, "alpha_msgs/Pose");
        assert_eq!(res.rejected, ["zeta_msgs/Pose"]);
    }

    #[test]
    fn test_unresolved_name() {
        let index = SchemaIndex::new();
        assert!(
            index
                .resolve("Nothing", None, ResolutionPolicy::default())
                .is_none()
        );
    }
}
