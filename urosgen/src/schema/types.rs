/// Core types for interface schema parsing
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Primitive field types recognized by the interface grammar
pub const PRIMITIVE_TYPES: &[&str] = &[
    "bool", "byte", "char", "float32", "float64", "int8", "uint8", "int16", "uint16", "int32",
    "uint32", "int64", "uint64", "string", "wstring", "duration", "time",
];

/// Token marking an upper bound in array and string specifiers
pub const UPPER_BOUND_TOKEN: &str = "<=";

/// Classification of a resolved type token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A built-in scalar type
    Primitive,
    /// A (possibly bounded) string or wstring
    String,
    /// A reference to another message schema
    Nested,
}

/// A single field's type: base name, array-ness, retained bounds, and the
/// embedded schema when the base name resolved to another message.
///
/// The wire shape is the interchange contract `{type, array, fields?}`;
/// bounds are retained in memory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSpec {
    /// Base type name with array/bound decorations stripped
    #[serde(rename = "type")]
    pub base_name: String,
    /// Whether the token carried an array suffix
    #[serde(rename = "array")]
    pub is_array: bool,
    /// Resolved schema of the referenced message, when the base name matched
    /// an index entry
    #[serde(rename = "fields", default, skip_serializing_if = "Option::is_none")]
    pub nested: Option<FieldSet>,
    /// Array length or upper bound, when one was written (not enforced)
    #[serde(skip)]
    pub array_bound: Option<u32>,
    /// String upper bound for `string<=N` / `wstring<=N` (not enforced)
    #[serde(skip)]
    pub string_bound: Option<u32>,
}

impl TypeSpec {
    /// Resolve one raw type token into its base name and modifiers.
    ///
    /// Handles `int32`, `string<=23`, `geometry_msgs/Pose[]`, `Pose[<=5]`,
    /// `float64[9]`. There is no failure mode: tokens that match nothing are
    /// passed through as opaque base names for the registry to resolve or
    /// leave unresolved.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        let (base, is_array, array_bound) = split_array_suffix(token);
        let (base_name, string_bound) = collapse_bounded_string(base);

        TypeSpec {
            base_name,
            is_array,
            nested: None,
            array_bound,
            string_bound,
        }
    }

    /// Classification of this type
    #[must_use]
    pub fn kind(&self) -> TypeKind {
        if self.nested.is_some() {
            return TypeKind::Nested;
        }
        if self.base_name == "string" || self.base_name == "wstring" {
            return TypeKind::String;
        }
        if PRIMITIVE_TYPES.contains(&self.base_name.as_str()) {
            TypeKind::Primitive
        } else {
            TypeKind::Nested
        }
    }

    /// Check if this is a primitive (non-string, non-nested) type
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.kind() == TypeKind::Primitive
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_name)?;
        if let Some(bound) = self.string_bound {
            write!(f, "{UPPER_BOUND_TOKEN}{bound}")?;
        }
        if self.is_array {
            match self.array_bound {
                Some(bound) => write!(f, "[{bound}]")?,
                None => write!(f, "[]")?,
            }
        }
        Ok(())
    }
}

/// Strip a trailing `[...]` specifier, returning (base, is_array, bound).
///
/// Bracket contents may be empty, a plain length, or `<=N`. Contents that
/// parse as neither still strip the suffix; the bound is simply absent.
fn split_array_suffix(token: &str) -> (&str, bool, Option<u32>) {
    if !token.ends_with(']') {
        return (token, false, None);
    }
    let Some(open) = token.rfind('[') else {
        return (token, false, None);
    };

    let spec = &token[open + 1..token.len() - 1];
    let bound = spec
        .trim()
        .strip_prefix(UPPER_BOUND_TOKEN)
        .unwrap_or(spec)
        .trim()
        .parse::<u32>()
        .ok();

    (&token[..open], true, bound)
}

/// Collapse `string<=N` / `wstring<=N` to base `string`, retaining the bound.
///
/// The wide/narrow distinction is dropped, matching the generated C side
/// where both map to the same runtime string type.
fn collapse_bounded_string(base: &str) -> (String, Option<u32>) {
    for prefix in ["string", "wstring"] {
        if let Some(rest) = base.strip_prefix(prefix)
            && let Some(bound_str) = rest.strip_prefix(UPPER_BOUND_TOKEN)
            && let Ok(bound) = bound_str.trim().parse::<u32>()
        {
            return ("string".to_string(), Some(bound));
        }
    }
    (base.to_string(), None)
}

/// An ordered field-name → type mapping. Insertion order is declaration
/// order and is preserved through serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSet(IndexMap<String, TypeSpec>);

impl FieldSet {
    /// Create an empty field set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the previous entry if the name was already
    /// declared (last write wins)
    pub fn insert(&mut self, name: impl Into<String>, spec: TypeSpec) -> Option<TypeSpec> {
        self.0.insert(name.into(), spec)
    }

    /// Get a field by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeSpec> {
        self.0.get(name)
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the set has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate fields in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TypeSpec)> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = (&'a String, &'a TypeSpec);
    type IntoIter = indexmap::map::Iter<'a, String, TypeSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A message schema is its ordered field set
pub type MessageSchema = FieldSet;

/// Service schema: paired request/response field sets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceSchema {
    /// Request fields
    pub request: FieldSet,
    /// Response fields
    pub response: FieldSet,
}

/// Action schema: goal/result/feedback field sets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionSchema {
    /// Goal fields
    pub goal: FieldSet,
    /// Result fields
    pub result: FieldSet,
    /// Feedback fields
    pub feedback: FieldSet,
}
