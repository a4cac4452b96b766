//! Two-Phase Interface Registry
//!
//! Builds the package graph from interface files found under a set of root
//! directories. Phase 1 indexes every message schema so that phase 2 can
//! resolve nested references regardless of file-discovery order; forward
//! references across files and packages need no declaration ordering.
//!
//! File-level problems (a missing root, an unreadable file) are recoverable:
//! the affected entry is skipped, a diagnostic is recorded, and the scan
//! continues. The graph is returned even when some files failed.

/// Phase-1 index and resolution policies
pub mod index;
/// File discovery
pub mod scanner;

pub use index::{Resolution, ResolutionPolicy, SchemaIndex};
pub use scanner::{FileKind, FsScanner, InterfaceFile, InterfaceScanner, UNKNOWN_PACKAGE};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::schema::{
    ActionSchema, Diagnostic, PackageGraph, ParseMode, SchemaParser, SchemaResult, ServiceSchema,
};

/// Section sentinel in service and action files
pub const SECTION_SEPARATOR: &str = "---";

/// A diagnostic annotated with the file it came from, when one applies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanDiagnostic {
    /// File the finding refers to (absent for root-level findings)
    pub file: Option<PathBuf>,
    /// The finding itself
    pub diagnostic: Diagnostic,
}

impl fmt::Display for ScanDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(path) => write!(f, "{}: {}", path.display(), self.diagnostic),
            None => write!(f, "{}", self.diagnostic),
        }
    }
}

/// Result of a registry build: the graph plus everything worth reporting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    /// The assembled package graph
    pub graph: PackageGraph,
    /// Collected recoverable findings, in scan order
    pub diagnostics: Vec<ScanDiagnostic>,
}

/// Registry builder: configured roots, resolution policy, and parse mode.
///
/// ```no_run
/// use urosgen::registry::InterfaceRegistry;
///
/// let outcome = InterfaceRegistry::new()
///     .root("/opt/ros/jazzy/share")
///     .root("install/share")
///     .build()?;
/// println!("{} messages", outcome.graph.message_count());
/// # Ok::<(), urosgen::schema::SchemaError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct InterfaceRegistry<S = FsScanner> {
    roots: Vec<PathBuf>,
    policy: ResolutionPolicy,
    mode: ParseMode,
    scanner: S,
}

impl InterfaceRegistry<FsScanner> {
    /// Create a registry backed by the filesystem scanner
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: InterfaceScanner> InterfaceRegistry<S> {
    /// Create a registry with an injected scanner
    #[must_use]
    pub fn with_scanner(scanner: S) -> Self {
        InterfaceRegistry {
            roots: Vec::new(),
            policy: ResolutionPolicy::default(),
            mode: ParseMode::default(),
            scanner,
        }
    }

    /// Add a root directory to scan
    #[must_use]
    pub fn root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.roots.push(path.as_ref().to_path_buf());
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

    /// Run both phases and assemble the package graph
    ///
    /// # Errors
    ///
    /// Returns [`crate::schema::SchemaError::LineParseError`] in strict mode
    /// when a file contains an unparseable line. Permissive mode never fails;
    /// problems surface as diagnostics instead.
    pub fn build(&self) -> SchemaResult<ScanOutcome> {
        let mut diagnostics = Vec::new();
        let files = self.collect_files(&mut diagnostics);

        // Phase 1: index every message schema before any nested reference is
        // resolved. Diagnostics are deferred to phase 2, which re-parses the
        // same content with the index attached.
        let mut schema_index = SchemaIndex::new();
        for (file, content) in &files {
            if file.kind == FileKind::Message {
                let block = SchemaParser::new().parse_str(content)?;
                schema_index.insert(&file.package, &file.name, block.fields);
            }
        }
        debug!(indexed = schema_index.len(), "phase 1 complete");

        // Phase 2: parse everything against the completed index
        let mut graph = PackageGraph::new();
        for (file, content) in &files {
            let parser = SchemaParser::new()
                .context_package(&file.package)
                .index(&schema_index)
                .policy(self.policy)
                .mode(self.mode);
            let lines: Vec<&str> = content.lines().collect();
            let package = graph.package_mut(&file.package);
            let mut file_diagnostics = Vec::new();

            match file.kind {
                FileKind::Message => {
                    let block = parser.parse_block(&lines)?;
                    file_diagnostics.extend(block.diagnostics);
                    package.messages.insert(file.name.clone(), block.fields);
                }
                FileKind::Service => {
                    let (request_lines, response_lines) = split_service(&lines);
                    let request = parser.parse_block(&request_lines)?;
                    let response = parser.parse_block(&response_lines)?;
                    file_diagnostics.extend(request.diagnostics);
                    file_diagnostics.extend(response.diagnostics);
                    package.services.insert(file.name.clone(), ServiceSchema {
                        request: request.fields,
                        response: response.fields,
                    });
                }
                FileKind::Action => {
                    let [goal_lines, result_lines, feedback_lines] = split_action(&lines);
                    let goal = parser.parse_block(&goal_lines)?;
                    let result = parser.parse_block(&result_lines)?;
                    let feedback = parser.parse_block(&feedback_lines)?;
                    file_diagnostics.extend(goal.diagnostics);
                    file_diagnostics.extend(result.diagnostics);
                    file_diagnostics.extend(feedback.diagnostics);
                    package.actions.insert(file.name.clone(), ActionSchema {
                        goal: goal.fields,
                        result: result.fields,
                        feedback: feedback.fields,
                    });
                }
            }

            debug!(file = %file.path.display(), kind = %file.kind, "parsed interface");
            diagnostics.extend(file_diagnostics.into_iter().map(|diagnostic| {
                ScanDiagnostic {
                    file: Some(file.path.clone()),
                    diagnostic,
                }
            }));
        }

        if !diagnostics.is_empty() {
            warn!(count = diagnostics.len(), "registry build finished with diagnostics");
        }

        Ok(ScanOutcome { graph, diagnostics })
    }

    /// Enumerate and read all interface files, recording root and file
    /// failures as diagnostics
    fn collect_files(&self, diagnostics: &mut Vec<ScanDiagnostic>) -> Vec<(InterfaceFile, String)> {
        let mut files = Vec::new();
        for root in &self.roots {
            let found = match self.scanner.scan(root) {
                Ok(found) => found,
                Err(_) => {
                    diagnostics.push(ScanDiagnostic {
                        file: None,
                        diagnostic: Diagnostic::MissingRoot { path: root.clone() },
                    });
                    continue;
                }
            };
            for file in found {
                match fs::read_to_string(&file.path) {
                    Ok(content) => files.push((file, content)),
                    Err(err) => diagnostics.push(ScanDiagnostic {
                        file: None,
                        diagnostic: Diagnostic::UnreadableFile {
                            path: file.path,
                            reason: err.to_string(),
                        },
                    }),
                }
            }
        }
        files
    }
}

/// Split service lines at the first section sentinel.
///
/// Without a sentinel every line belongs to the request and the response is
/// empty.
fn split_service<'a>(lines: &[&'a str]) -> (Vec<&'a str>, Vec<&'a str>) {
    match lines.iter().position(|line| line.trim() == SECTION_SEPARATOR) {
        Some(pos) => (lines[..pos].to_vec(), lines[pos + 1..].to_vec()),
        None => (lines.to_vec(), Vec::new()),
    }
}

/// Split action lines into goal/result/feedback; content past the third
/// section is discarded
fn split_action<'a>(lines: &[&'a str]) -> [Vec<&'a str>; 3] {
    let mut sections: [Vec<&str>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    let mut current = 0;
    for line in lines {
        if line.trim() == SECTION_SEPARATOR {
            current += 1;
            continue;
        }
        if current < 3 {
            sections[current].push(line);
        }
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_service_with_separator() {
        let lines = ["int32 a", "---", "int32 b"];
        let (request, response) = split_service(&lines);
        assert_eq!(request, ["int32 a"]);
        assert_eq!(response, ["int32 b"]);
    }

    #[test]
    fn test_split_service_without_separator() {
        let lines = ["int32 a", "int32 b"];
        let (request, response) = split_service(&lines);
        assert_eq!(request.len(), 2);
        assert!(response.is_empty());
    }

    #[test]
    fn test_split_action_discards_trailing_content() {
        let lines = [
            "int32 order",
            "---",
            "int32[] sequence",
            "---",
            "int32[] partial",
            "---",
            "int32 dropped",
        ];
        let [goal, result, feedback] = split_action(&lines);
        assert_eq!(goal, ["int32 order"]);
        assert_eq!(result, ["int32[] sequence"]);
        assert_eq!(feedback, ["int32[] partial"]);
    }

    #[test]
    fn test_split_action_single_section() {
        let lines = ["int32 order"];
        let [goal, result, feedback] = split_action(&lines);
        assert_eq!(goal.len(), 1);
        assert!(result.is_empty());
        assert!(feedback.is_empty());
    }
}
