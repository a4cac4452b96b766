use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use urosgen::registry::{InterfaceRegistry, ResolutionPolicy};
use urosgen::schema::{Diagnostic, ParseMode};

/// Helper to create an interface file under `<root>/<package>/<kind>/`
fn create_interface_file(
    dir: &TempDir,
    package: &str,
    kind: &str,
    filename: &str,
    content: &str,
) -> PathBuf {
    let sub_dir = dir.path().join(package).join(kind);
    fs::create_dir_all(&sub_dir).unwrap();
    let file_path = sub_dir.join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}

#[test]
fn test_scan_builds_all_kinds() {
    let dir = TempDir::new().unwrap();
    create_interface_file(&dir, "std_msgs", "msg", "Int32.msg", "int32 data\n");
    create_interface_file(
        &dir,
        "example_msgs",
        "srv",
        "AddTwoInts.srv",
        "int64 a\nint64 b\n---\nint64 sum\n",
    );
    create_interface_file(
        &dir,
        "example_msgs",
        "action",
        "Fibonacci.action",
        "int32 order\n---\nint32[] sequence\n---\nint32[] partial_sequence\n",
    );

    let outcome = InterfaceRegistry::new().root(dir.path()).build().unwrap();
    assert!(outcome.diagnostics.is_empty());

    let graph = &outcome.graph;
    assert_eq!(graph.message_count(), 1);
    assert_eq!(graph.service_count(), 1);
    assert_eq!(graph.action_count(), 1);

    let srv = graph.service("example_msgs", "AddTwoInts").unwrap();
    assert_eq!(srv.request.len(), 2);
    assert_eq!(srv.response.len(), 1);

    let action = graph.action("example_msgs", "Fibonacci").unwrap();
    assert_eq!(action.goal.len(), 1);
    assert_eq!(action.result.len(), 1);
    assert_eq!(action.feedback.len(), 1);
    assert!(action.result.get("sequence").unwrap().is_array);
}

#[test]
fn test_forward_reference_across_scan_order() {
    let dir = TempDir::new().unwrap();
    // "AaContainer.msg" sorts before "ZzPoint.msg", so the reference is
    // discovered before its target; the two-phase build must still resolve it
    create_interface_file(
        &dir,
        "a_pkg",
        "msg",
        "AaContainer.msg",
        "b_pkg/ZzPoint origin\nZzPoint[] corners\n",
    );
    create_interface_file(&dir, "b_pkg", "msg", "ZzPoint.msg", "float64 x\nfloat64 y\n");

    let outcome = InterfaceRegistry::new().root(dir.path()).build().unwrap();
    let container = outcome.graph.message("a_pkg", "AaContainer").unwrap();

    let origin = container.get("origin").unwrap();
    let nested = origin.nested.as_ref().unwrap();
    assert_eq!(nested.len(), 2);
    assert!(nested.get("x").is_some());

    // Unqualified reference resolves by suffix across packages
    let corners = container.get("corners").unwrap();
    assert!(corners.is_array);
    assert!(corners.nested.is_some());
}

#[test]
fn test_service_without_separator_has_empty_response() {
    let dir = TempDir::new().unwrap();
    create_interface_file(
        &dir,
        "odd_msgs",
        "srv",
        "FireAndForget.srv",
        "int32 command\nstring argument\n",
    );

    let outcome = InterfaceRegistry::new().root(dir.path()).build().unwrap();
    let srv = outcome.graph.service("odd_msgs", "FireAndForget").unwrap();
    assert_eq!(srv.request.len(), 2);
    assert_eq!(srv.response.len(), 0);
}

#[test]
fn test_action_trailing_content_is_discarded() {
    let dir = TempDir::new().unwrap();
    create_interface_file(
        &dir,
        "odd_msgs",
        "action",
        "Overfull.action",
        "int32 goal_field\n---\nint32 result_field\n---\nint32 feedback_field\n---\nint32 extra\n",
    );

    let outcome = InterfaceRegistry::new().root(dir.path()).build().unwrap();
    let action = outcome.graph.action("odd_msgs", "Overfull").unwrap();
    assert_eq!(action.goal.len(), 1);
    assert_eq!(action.result.len(), 1);
    assert_eq!(action.feedback.len(), 1);
    assert!(action.feedback.get("extra").is_none());
}

#[test]
fn test_missing_root_is_recoverable() {
    let dir = TempDir::new().unwrap();
    create_interface_file(&dir, "std_msgs", "msg", "Bool.msg", "bool data\n");

    let outcome = InterfaceRegistry::new()
        .root("/no/such/share/directory")
        .root(dir.path())
        .build()
        .unwrap();

    // The good root is still fully scanned
    assert_eq!(outcome.graph.message_count(), 1);
    assert!(outcome.diagnostics.iter().any(|d| matches!(
        d.diagnostic,
        Diagnostic::MissingRoot { .. }
    )));
}

#[test]
fn test_ambiguous_reference_policies() {
    let dir = TempDir::new().unwrap();
    create_interface_file(&dir, "alpha_msgs", "msg", "Pose.msg", "float64 a\n");
    create_interface_file(&dir, "zeta_msgs", "msg", "Pose.msg", "float64 z\n");
    create_interface_file(&dir, "zeta_msgs", "msg", "Robot.msg", "Pose pose\n");

    // Default: the referencing package wins
    let outcome = InterfaceRegistry::new().root(dir.path()).build().unwrap();
    let robot = outcome.graph.message("zeta_msgs", "Robot").unwrap();
    let nested = robot.get("pose").unwrap().nested.as_ref().unwrap();
    assert!(nested.get("z").is_some());
    assert!(outcome.diagnostics.iter().any(|d| matches!(
        &d.diagnostic,
        Diagnostic::AmbiguousNestedType { chosen, .. } if chosen == "zeta_msgs/Pose"
    )));

    // Compatibility mode: lexicographically first match wins
    let outcome = InterfaceRegistry::new()
        .root(dir.path())
        .policy(ResolutionPolicy::FirstMatchLexicographic)
        .build()
        .unwrap();
    let robot = outcome.graph.message("zeta_msgs", "Robot").unwrap();
    let nested = robot.get("pose").unwrap().nested.as_ref().unwrap();
    assert!(nested.get("a").is_some());
}

#[test]
fn test_unresolved_reference_is_left_opaque() {
    let dir = TempDir::new().unwrap();
    create_interface_file(&dir, "a_pkg", "msg", "Holder.msg", "MissingType value\n");

    let outcome = InterfaceRegistry::new().root(dir.path()).build().unwrap();
    let holder = outcome.graph.message("a_pkg", "Holder").unwrap();
    assert!(holder.get("value").unwrap().nested.is_none());
    assert!(outcome.diagnostics.iter().any(|d| matches!(
        &d.diagnostic,
        Diagnostic::UnresolvedNestedType { base_name, .. } if base_name == "MissingType"
    )));
}

#[test]
fn test_strict_mode_fails_on_bad_line() {
    let dir = TempDir::new().unwrap();
    create_interface_file(&dir, "a_pkg", "msg", "Broken.msg", "int32 x\n???\n");

    let permissive = InterfaceRegistry::new().root(dir.path()).build().unwrap();
    assert_eq!(permissive.graph.message_count(), 1);
    assert!(permissive.diagnostics.iter().any(|d| matches!(
        d.diagnostic,
        Diagnostic::ParseSkip { line: 2, .. }
    )));

    let strict = InterfaceRegistry::new()
        .root(dir.path())
        .mode(ParseMode::Strict)
        .build();
    assert!(strict.is_err());
}

#[test]
fn test_interchange_format_shape() {
    let dir = TempDir::new().unwrap();
    create_interface_file(&dir, "b_pkg", "msg", "Point.msg", "float64 x\n");
    create_interface_file(&dir, "a_pkg", "msg", "Marker.msg", "b_pkg/Point at\nint32 id\n");

    let outcome = InterfaceRegistry::new().root(dir.path()).build().unwrap();
    let json = serde_json::to_value(&outcome.graph).unwrap();

    let expected = serde_json::json!({
        "a_pkg": {
            "msg": {
                "Marker": {
                    "at": {
                        "type": "b_pkg/Point",
                        "array": false,
                        "fields": {"x": {"type": "float64", "array": false}}
                    },
                    "id": {"type": "int32", "array": false}
                }
            },
            "srv": {},
            "action": {}
        },
        "b_pkg": {
            "msg": {
                "Point": {"x": {"type": "float64", "array": false}}
            },
            "srv": {},
            "action": {}
        }
    });
    assert_eq!(json, expected);
}

#[test]
fn test_rebuild_is_deterministic() {
    let dir = TempDir::new().unwrap();
    create_interface_file(&dir, "std_msgs", "msg", "Header.msg", "uint32 seq\nstring frame_id\n");
    create_interface_file(&dir, "nav_msgs", "msg", "Path.msg", "std_msgs/Header header\n");

    let registry = InterfaceRegistry::new().root(dir.path());
    let first = registry.build().unwrap();
    let second = registry.build().unwrap();
    assert_eq!(first.graph, second.graph);
    assert_eq!(
        serde_json::to_string(&first.graph).unwrap(),
        serde_json::to_string(&second.graph).unwrap()
    );
}
