//! Deterministic name mangling for generated source.
//!
//! A [`TypeRef`] is a `package/category/TypeName` reference. The C symbol
//! and the header include path derived from it must match the layout of the
//! generated support libraries exactly or the emitted code will not compile,
//! so both are pure functions of the reference alone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error for a reference that does not have exactly three segments
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed type reference '{reference}': expected package/category/name, found {segments} segment(s)")]
pub struct MalformedTypeRef {
    /// The offending reference string
    pub reference: String,
    /// The number of `/`-delimited segments found
    pub segments: usize,
}

/// A validated `package/category/TypeName` reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeRef {
    /// Package name (e.g. `geometry_msgs`)
    pub package: String,
    /// Interface category (`msg`, `srv`, or `action`)
    pub category: String,
    /// Type name (e.g. `PoseStamped`)
    pub name: String,
}

impl TypeRef {
    /// Mangled C symbol: segments joined with double underscores.
    ///
    /// `geometry_msgs/msg/PoseStamped` → `geometry_msgs__msg__PoseStamped`
    #[must_use]
    pub fn symbol(&self) -> String {
        format!("{}__{}__{}", self.package, self.category, self.name)
    }

    /// Header include path with the type name in lower snake case.
    ///
    /// `geometry_msgs/msg/PoseStamped` → `geometry_msgs/msg/pose_stamped.h`
    #[must_use]
    pub fn header_path(&self) -> String {
        format!("{}/{}/{}.h", self.package, self.category, snake_name(&self.name))
    }

    /// Comma-separated form used by type-support macros:
    /// `geometry_msgs, msg, PoseStamped`
    #[must_use]
    pub fn comma_form(&self) -> String {
        format!("{}, {}, {}", self.package, self.category, self.name)
    }
}

impl FromStr for TypeRef {
    type Err = MalformedTypeRef;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 3 {
            return Err(MalformedTypeRef {
                reference: s.to_string(),
                segments: parts.len(),
            });
        }
        Ok(TypeRef {
            package: parts[0].to_string(),
            category: parts[1].to_string(),
            name: parts[2].to_string(),
        })
    }
}

impl TryFrom<String> for TypeRef {
    type Error = MalformedTypeRef;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TypeRef> for String {
    fn from(r: TypeRef) -> Self {
        r.to_string()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.package, self.category, self.name)
    }
}

/// Lower the type name by inserting an underscore before every internal
/// uppercase letter (never before a leading one) and lowercasing.
///
/// This intentionally splits runs of capitals (`IMUData` → `i_m_u_data`) to
/// match the header layout of the generated support libraries.
fn snake_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            out.push('_');
        }
        out.push(c.to_ascii_lowercase());
    }
    out
}
