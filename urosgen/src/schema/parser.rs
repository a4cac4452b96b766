/// Field-block parsing for message, service, and action bodies
use std::sync::LazyLock;

use regex::Regex;

use super::errors::{Diagnostic, SchemaError, SchemaResult};
use super::types::{FieldSet, TypeKind, TypeSpec, UPPER_BOUND_TOKEN};
use crate::registry::{ResolutionPolicy, SchemaIndex};

/// Comment delimiter in interface files
pub const COMMENT_DELIMITER: char = '#';

/// Constant assignment token
pub const CONSTANT_SEPARATOR: char = '=';

/// Field line grammar: a type token followed by a field name; anything after
/// the name is ignored (default values are not modeled).
static FIELD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<rawtype>[^\s#]+)\s+(?P<name>\w+)").unwrap());

/// How to treat lines that match neither the field grammar nor a constant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Skip the line and record a [`Diagnostic::ParseSkip`] (compatibility
    /// default)
    #[default]
    Permissive,
    /// Fail the block with [`SchemaError::LineParseError`]
    Strict,
}

/// A parsed block: the ordered fields plus everything worth reporting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBlock {
    /// Fields in declaration order
    pub fields: FieldSet,
    /// Collected non-fatal findings
    pub diagnostics: Vec<Diagnostic>,
}

/// Parser for one block of field declarations.
///
/// A block is a message body or a single request/response/goal/result/
/// feedback section; section splitting happens in the registry. When a
/// [`SchemaIndex`] is attached, non-primitive base names are resolved and the
/// matching schema is embedded into the field's [`TypeSpec`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaParser<'a> {
    context_package: Option<&'a str>,
    index: Option<&'a SchemaIndex>,
    policy: ResolutionPolicy,
    mode: ParseMode,
}

impl<'a> SchemaParser<'a> {
    /// Create a parser with no index and permissive mode
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the package the parsed block belongs to (used by same-package
    /// resolution)
    #[must_use]
    pub fn context_package(mut self, package: &'a str) -> Self {
        self.context_package = Some(package);
        self
    }

    /// Attach a schema index for nested-reference resolution
    #[must_use]
    pub fn index(mut self, index: &'a SchemaIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the nested-reference resolution policy
    #[must_use]
    pub fn policy(mut self, policy: ResolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the unparseable-line handling mode
    #[must_use]
    pub fn mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Parse a whole block given as one string
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::LineParseError`] in strict mode for a line that
    /// matches neither the field grammar nor a constant definition.
    pub fn parse_str(&self, content: &str) -> SchemaResult<ParsedBlock> {
        let lines: Vec<&str> = content.lines().collect();
        self.parse_block(&lines)
    }

    /// Parse the raw lines of one block
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::LineParseError`] in strict mode for a line that
    /// matches neither the field grammar nor a constant definition.
    pub fn parse_block<S: AsRef<str>>(&self, lines: &[S]) -> SchemaResult<ParsedBlock> {
        let mut block = ParsedBlock::default();

        for (index, raw_line) in lines.iter().enumerate() {
            let line_num = index + 1;
            let content = strip_comment(raw_line.as_ref()).trim();

            if content.is_empty() {
                continue;
            }

            // Constant definitions are intentionally not modeled
            if is_constant_line(content) {
                continue;
            }

            let Some(captures) = FIELD_PATTERN.captures(content) else {
                match self.mode {
                    ParseMode::Strict => {
                        return Err(SchemaError::LineParseError {
                            line: line_num,
                            message: format!("'{content}' is not a field declaration"),
                        });
                    }
                    ParseMode::Permissive => {
                        block.diagnostics.push(Diagnostic::ParseSkip {
                            line: line_num,
                            content: content.to_string(),
                        });
                        continue;
                    }
                }
            };

            let name = &captures["name"];
            let spec = self.resolve_field(&captures["rawtype"], name, &mut block.diagnostics);

            if block.fields.insert(name, spec).is_some() {
                block.diagnostics.push(Diagnostic::DuplicateField {
                    line: line_num,
                    field: name.to_string(),
                });
            }
        }

        Ok(block)
    }

    fn resolve_field(
        &self,
        raw_type: &str,
        field_name: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> TypeSpec {
        let mut spec = TypeSpec::from_token(raw_type);
        if spec.kind() != TypeKind::Nested {
            return spec;
        }

        let Some(index) = self.index else {
            return spec;
        };

        match index.resolve(&spec.base_name, self.context_package, self.policy) {
            Some(resolution) => {
                if !resolution.rejected.is_empty() {
                    diagnostics.push(Diagnostic::AmbiguousNestedType {
                        base_name: spec.base_name.clone(),
                        chosen: resolution.key.to_string(),
                        rejected: resolution.rejected.clone(),
                    });
                }
                spec.nested = Some(resolution.schema.clone());
            }
            None => {
                diagnostics.push(Diagnostic::UnresolvedNestedType {
                    base_name: spec.base_name.clone(),
                    field: field_name.to_string(),
                });
            }
        }

        spec
    }
}

/// Drop everything from the comment delimiter onward
fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_DELIMITER) {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Check whether a comment-stripped line is a constant definition.
///
/// An `=` also appears in array and string bound syntax (`[<=5]`,
/// `string<=23`), which must still parse as fields.
fn is_constant_line(content: &str) -> bool {
    content.contains(CONSTANT_SEPARATOR) && !is_bound_syntax(content)
}

/// Check for bound syntax that should not be confused with constants
fn is_bound_syntax(content: &str) -> bool {
    if !content.contains(UPPER_BOUND_TOKEN) {
        return false;
    }
    content.contains('[')
        || content.contains(']')
        || content.contains("string")
        || content.contains("wstring")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_block() {
        let content = "\n# header comment\nint32 x\nint32 y  # trailing comment\nstring name\n";
        let block = SchemaParser::new().parse_str(content).unwrap();

        assert_eq!(block.fields.len(), 3);
        assert!(block.diagnostics.is_empty());
        let names: Vec<&String> = block.fields.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["x", "y", "name"]);
    }

    #[test]
    fn test_constants_are_skipped() {
        let content = "int32 MAX_SPEED=100\nstring NAME=\"base\"\nfloat64 velocity\n";
        let block = SchemaParser::new().parse_str(content).unwrap();

        assert_eq!(block.fields.len(), 1);
        assert!(block.fields.get("velocity").is_some());
        assert!(block.diagnostics.is_empty());
    }

    #[test]
    fn test_bounded_types_are_not_constants() {
        let content = "string<=23 label\nfloat64[<=5] readings\n";
        let block = SchemaParser::new().parse_str(content).unwrap();

        assert_eq!(block.fields.len(), 2);
        assert_eq!(block.fields.get("label").unwrap().string_bound, Some(23));
        assert_eq!(block.fields.get("readings").unwrap().array_bound, Some(5));
    }

    #[test]
    fn test_unparseable_line_permissive() {
        let content = "int32 x\n???\n";
        let block = SchemaParser::new().parse_str(content).unwrap();

        assert_eq!(block.fields.len(), 1);
        assert_eq!(block.diagnostics.len(), 1);
        assert!(matches!(
            block.diagnostics[0],
            Diagnostic::ParseSkip { line: 2, .. }
        ));
    }

    #[test]
    fn test_unparseable_line_strict() {
        let content = "int32 x\n???\n";
        let result = SchemaParser::new().mode(ParseMode::Strict).parse_str(content);

        assert!(matches!(
            result,
            Err(SchemaError::LineParseError { line: 2, .. })
        ));
    }

    #[test]
    fn test_duplicate_field_last_write_wins() {
        let content = "int32 x\nfloat64 x\n";
        let block = SchemaParser::new().parse_str(content).unwrap();

        assert_eq!(block.fields.len(), 1);
        assert_eq!(block.fields.get("x").unwrap().base_name, "float64");
        assert!(matches!(
            block.diagnostics[0],
            Diagnostic::DuplicateField { line: 2, .. }
        ));
    }

    #[test]
    fn test_nested_resolution_against_index() {
        let mut index = SchemaIndex::new();
        let inner = SchemaParser::new().parse_str("float64 x\nfloat64 y\n").unwrap();
        index.insert("geometry_msgs", "Point", inner.fields);

        let block = SchemaParser::new()
            .context_package("geometry_msgs")
            .index(&index)
            .parse_str("Point position\nint32 id\n")
            .unwrap();

        let position = block.fields.get("position").unwrap();
        assert_eq!(position.kind(), TypeKind::Nested);
        let nested = position.nested.as_ref().unwrap();
        assert_eq!(nested.len(), 2);
        assert!(block.fields.get("id").unwrap().nested.is_none());
    }

    #[test]
    fn test_unresolved_nested_type_diagnostic() {
        let index = SchemaIndex::new();
        let block = SchemaParser::new()
            .index(&index)
            .parse_str("Missing thing\n")
            .unwrap();

        assert!(block.fields.get("thing").unwrap().nested.is_none());
        assert!(matches!(
            block.diagnostics[0],
            Diagnostic::UnresolvedNestedType { .. }
        ));
    }

    #[test]
    fn test_rest_of_line_ignored() {
        let content = "int32 x 42\n";
        let block = SchemaParser::new().parse_str(content).unwrap();
        assert_eq!(block.fields.len(), 1);
        assert_eq!(block.fields.get("x").unwrap().base_name, "int32");
    }
}
