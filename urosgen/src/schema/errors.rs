/// Error and diagnostic types for schema parsing
use std::path::PathBuf;

use thiserror::Error;

/// Fatal error raised while parsing interface definitions
#[derive(Error, Debug)]
#[allow(missing_docs)]
pub enum SchemaError {
    #[error("Parse error at line {line}: {message}")]
    LineParseError { line: usize, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Regex error: {0}")]
    RegexError(#[from] regex::Error),
}

/// Result type for schema parsing operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Non-fatal findings collected while parsing and resolving schemas.
///
/// Diagnostics never abort a registry build; they are batched and returned
/// alongside the parsed result so callers can decide what to surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A line matched neither the field grammar nor a constant definition
    #[error("Skipped unparseable line {line}: '{content}'")]
    ParseSkip {
        /// 1-based line number within the block
        line: usize,
        /// The offending line, comment stripped
        content: String,
    },

    /// A field name was declared twice within one block (last write wins)
    #[error("Duplicate field '{field}' at line {line}, previous definition replaced")]
    DuplicateField {
        /// 1-based line number of the duplicate
        line: usize,
        /// The duplicated field name
        field: String,
    },

    /// A nested type reference matched nothing in the schema index
    #[error("Unresolved nested type '{base_name}' referenced by field '{field}'")]
    UnresolvedNestedType {
        /// The unresolved base type name
        base_name: String,
        /// The referencing field
        field: String,
    },

    /// Multiple packages define the referenced short name
    #[error("Ambiguous nested type '{base_name}': chose '{chosen}' over {rejected:?}")]
    AmbiguousNestedType {
        /// The ambiguous short name
        base_name: String,
        /// The qualified key the resolution policy selected
        chosen: String,
        /// The qualified keys that also matched
        rejected: Vec<String>,
    },

    /// A configured root directory does not exist or cannot be listed
    #[error("Missing or unreadable root directory: {}", path.display())]
    MissingRoot {
        /// The configured root
        path: PathBuf,
    },

    /// An interface file could not be read; it was skipped
    #[error("Unreadable interface file {}: {reason}", path.display())]
    UnreadableFile {
        /// The skipped file
        path: PathBuf,
        /// The underlying IO error message
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SchemaError = io_err.into();
        assert!(matches!(err, SchemaError::IoError(..)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_line_parse_error_display() {
        let err = SchemaError::LineParseError {
            line: 7,
            message: "bad field".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains("bad field"));
    }

    #[test]
    fn test_diagnostic_display_messages() {
        let d = Diagnostic::ParseSkip {
            line: 3,
            content: "!!".to_string(),
        };
        assert!(d.to_string().contains("!!"));

        let d = Diagnostic::DuplicateField {
            line: 5,
            field: "x".to_string(),
        };
        assert!(d.to_string().contains("'x'"));

        let d = Diagnostic::AmbiguousNestedType {
            base_name: "Pose".to_string(),
            chosen: "geometry_msgs/Pose".to_string(),
            rejected: vec!["turtle_msgs/Pose".to_string()],
        };
        let msg = d.to_string();
        assert!(msg.contains("geometry_msgs/Pose"));
        assert!(msg.contains("turtle_msgs/Pose"));
    }
}
