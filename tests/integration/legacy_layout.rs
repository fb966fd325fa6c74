//! Bundles created by older tooling under `.claude/` and `docs/`.

use workstate::state::{inspect, BundleState, Layout, NullSink, TerminationReport};
use workstate::{AbortEngine, AbortMode, Error, InitOptions, PathResolver, TaskType};

use super::fixtures::{archive_engine, init_engine, TestProject};

const LEGACY_DESCRIPTOR: &str = r#"{
  "version": "1.0",
  "taskName": "",
  "primaryType": "integration",
  "taskPrefix": "I",
  "constraints": {"maxFilesPerTask": 6},
  "phases": [{"name": "Phase 0: 契约确认"}]
}"#;

fn legacy_project() -> TestProject {
    let project = TestProject::new();
    project.write(".claude/workflow.json", LEGACY_DESCRIPTOR);
    project.write("docs/TASK_ANALYSIS.md", "old analysis");
    project.write("docs/TASK_STATUS.md", "old status");
    project
}

/// Test: Legacy descriptor discovery
/// Given only a legacy descriptor
/// When the descriptor is located
/// Then the legacy path is returned
#[test]
fn test_locate_legacy_descriptor() {
    let project = legacy_project();
    let resolver = PathResolver::new(&project.path).unwrap();
    let found = resolver.locate_descriptor().unwrap();
    assert_eq!(found.layout, Layout::Legacy);
    assert!(found.path.ends_with(".claude/workflow.json"));
}

/// Test: Archiving a legacy bundle
/// Given a legacy bundle with documents under docs/
/// When it is archived
/// Then the documents land in the current archive root and .claude is clean
#[test]
fn test_archive_legacy_bundle_into_current_layout() {
    let project = legacy_project();
    let report = archive_engine().archive(&project.path, None, &mut NullSink).unwrap();

    assert_eq!(project.archives(), vec!["20261019-integration-integration"]);
    assert_eq!(report.moved_count(), 2);
    assert_eq!(project.read(&format!(
        "docs/workflow/archive/{}/TASK_STATUS.md",
        project.archives()[0]
    )), "old status");
    assert!(!project.exists(".claude/workflow.json"));
    assert!(!project.exists("docs/TASK_ANALYSIS.md"));
}

/// Test: Legacy delete
/// Given a legacy bundle
/// When abort deletes it
/// Then the legacy documents and descriptor are gone
#[test]
fn test_abort_delete_legacy_bundle() {
    let project = legacy_project();
    let report = AbortEngine::default()
        .abort(&project.path, AbortMode::Delete, None, &mut NullSink)
        .unwrap();
    let TerminationReport::Deleted(r) = report else {
        panic!("expected delete report");
    };
    assert_eq!(r.deleted_count(), 2);
    assert!(!project.exists(".claude/workflow.json"));
    assert!(!project.exists("docs/TASK_STATUS.md"));
}

/// Test: Re-init over a legacy bundle
/// Given a legacy descriptor
/// When init runs without and then with force
/// Then the first is refused and the second leaves one authoritative copy
#[test]
fn test_force_init_migrates_descriptor() {
    let project = legacy_project();
    let options = InitOptions {
        task_type: Some(TaskType::Integration),
        ..Default::default()
    };
    let refused = init_engine().init(&project.path, &options, &mut NullSink);
    assert!(matches!(refused, Err(Error::DescriptorExists(_))));
    assert!(project.exists(".claude/workflow.json"));

    let forced = InitOptions {
        force: true,
        ..options
    };
    let report = init_engine().init(&project.path, &forced, &mut NullSink).unwrap();
    assert!(report.removed_legacy.is_some());
    assert!(!project.exists(".claude/workflow.json"));
    assert!(project.exists("docs/workflow/workflow.json"));
    // The new descriptor points at the current layout, so a fresh status
    // document is created even though the legacy one is still there.
    assert!(report.status_written);
    assert_eq!(project.read("docs/TASK_STATUS.md"), "old status");
}

/// Test: Both layouts present
/// Given descriptors at both locations
/// When the project is inspected and archived
/// Then the inconsistency is reported and only the current bundle is archived
#[test]
fn test_both_layouts_surfaced() {
    let project = legacy_project();
    init_engine()
        .init(
            &project.path,
            &InitOptions {
                force: true,
                ..Default::default()
            },
            &mut NullSink,
        )
        .unwrap();
    // Simulate a stale copy reappearing, e.g. from a branch checkout.
    project.write(".claude/workflow.json", LEGACY_DESCRIPTOR);

    let status = inspect(&project.path).unwrap();
    assert!(matches!(status.state, BundleState::Inconsistent { .. }));

    let report = archive_engine().archive(&project.path, None, &mut NullSink).unwrap();
    assert!(report.shadowed_legacy.is_some());
    assert!(project.exists(".claude/workflow.json"));
    assert!(!project.exists("docs/workflow/workflow.json"));

    let status = inspect(&project.path).unwrap();
    assert!(matches!(
        status.state,
        BundleState::Active(ref l) if l.layout == Layout::Legacy
    ));
}
