//! End-to-end lifecycle tests.

use workstate::state::{LifecycleEvent, NullSink, SkipReason, TerminationReport};
use workstate::workflow::StateKey;
use workstate::{AbortEngine, AbortMode, Error, InitOptions, TaskType, WorkflowConfig};

use super::fixtures::{archive_engine, count_dirs, count_files, init_engine, TestProject};

/// Test: Bugfix template
/// Given a fresh project
/// When init runs with type bugfix
/// Then the descriptor has the five bugfix phases and prefix B
#[test]
fn test_init_bugfix_scenario() {
    let project = TestProject::new();
    let options = InitOptions {
        task_type: Some(TaskType::Bugfix),
        ..Default::default()
    };
    let report = init_engine().init(&project.path, &options, &mut NullSink).unwrap();

    let config = WorkflowConfig::load(&report.descriptor_path).unwrap();
    assert_eq!(config.task_prefix, "B");
    let names: Vec<&str> = config.phases.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Phase 0: 复现",
            "Phase 1: 定位",
            "Phase 2: 修复",
            "Phase 3: 回归",
            "Phase 4: 加固",
        ]
    );

    let status = project.read("docs/workflow/TASK_STATUS.md");
    assert!(status.contains("| Phase 2: 修复 | 0 | 0 | 0 | 0 |"));
    assert!(status.contains("> 任务前缀: B"));
}

/// Test: Round trip
/// Given a project initialized with no other state files
/// When it is archived straight away
/// Then exactly the files init wrote are moved
#[test]
fn test_init_then_archive_round_trip() {
    let project = TestProject::new();
    let init = init_engine()
        .init(&project.path, &InitOptions::default(), &mut NullSink)
        .unwrap();

    let archive = archive_engine().archive(&project.path, None, &mut NullSink).unwrap();

    assert_eq!(archive.moved_count(), init.state_files_written());
    let moved_sources: Vec<_> = archive.moved.iter().map(|(from, _)| from.clone()).collect();
    assert_eq!(moved_sources, vec![init.status_path.clone()]);
    assert!(archive
        .skipped
        .iter()
        .all(|(path, reason)| *reason == SkipReason::Missing && *path != init.status_path));

    let snapshot = WorkflowConfig::load(&archive.descriptor_snapshot).unwrap();
    assert_eq!(snapshot, init.config);
    assert!(!project.exists("docs/workflow/workflow.json"));
    assert!(!project.exists("docs/workflow/TASK_STATUS.md"));
    assert_eq!(project.archives(), vec!["20261019-generic-generic"]);
}

/// Test: Archive label scenario
/// Given a refactor bundle with an empty task name and all four documents
/// When it is archived with label auth-cleanup
/// Then the label names the directory and the four documents are moved
#[test]
fn test_archive_with_label_and_full_bundle() {
    let project = TestProject::new();
    let options = InitOptions {
        task_type: Some(TaskType::Refactor),
        ..Default::default()
    };
    init_engine().init(&project.path, &options, &mut NullSink).unwrap();
    project.write("docs/workflow/TASK_ANALYSIS.md", "analysis");
    project.write("docs/workflow/TASK_PLAN.md", "plan");
    project.write("docs/workflow/DEPENDENCY_MAP.md", "deps");

    let mut events = Vec::new();
    let report = archive_engine()
        .archive(&project.path, Some("auth-cleanup"), &mut events)
        .unwrap();

    assert_eq!(
        report.directory.file_name().unwrap().to_string_lossy(),
        "20261019-refactor-auth-cleanup"
    );
    assert_eq!(report.moved_count(), 4);
    assert_eq!(report.skipped_count(), 1);
    for key in StateKey::ALL {
        assert!(report.directory.join(key.file_name()).exists(), "{key} archived");
    }
    let moves = events
        .iter()
        .filter(|e| matches!(e, LifecycleEvent::Moved { .. }))
        .count();
    assert_eq!(moves, 4);
}

/// Test: Repeated archives on one day
/// Given N lifecycles with identical type and label
/// When each is archived
/// Then N distinct directories exist, suffixed from -2 onwards
#[test]
fn test_repeated_archives_get_suffixes() {
    let project = TestProject::new();
    let options = InitOptions {
        task_type: Some(TaskType::Feature),
        task_name: Some("Dark Mode".to_string()),
        ..Default::default()
    };
    for _ in 0..4 {
        init_engine().init(&project.path, &options, &mut NullSink).unwrap();
        archive_engine().archive(&project.path, None, &mut NullSink).unwrap();
    }
    assert_eq!(
        project.archives(),
        vec![
            "20261019-feature-dark-mode",
            "20261019-feature-dark-mode-2",
            "20261019-feature-dark-mode-3",
            "20261019-feature-dark-mode-4",
        ]
    );
}

/// Test: Archive is not repeatable
/// Given an archived project
/// When archive runs again
/// Then it fails with a not-found error and creates nothing
#[test]
fn test_second_archive_fails() {
    let project = TestProject::new();
    init_engine()
        .init(&project.path, &InitOptions::default(), &mut NullSink)
        .unwrap();
    archive_engine().archive(&project.path, None, &mut NullSink).unwrap();

    let err = archive_engine()
        .archive(&project.path, None, &mut NullSink)
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(project.archives().len(), 1);
}

/// Test: Delete never creates anything
/// Given an active bundle with every document and a report
/// When abort runs in delete mode
/// Then file and directory counts under docs/workflow do not grow
#[test]
fn test_abort_delete_only_removes() {
    let project = TestProject::new();
    init_engine()
        .init(&project.path, &InitOptions::default(), &mut NullSink)
        .unwrap();
    project.write("docs/workflow/TASK_PLAN.md", "plan");
    project.write("docs/workflow/ABORT_REPORT.md", "abandoned");

    let workflow_dir = project.path.join("docs/workflow");
    let files_before = count_files(&workflow_dir);
    let dirs_before = count_dirs(&workflow_dir);

    let report = AbortEngine::new(archive_engine())
        .abort(&project.path, AbortMode::Delete, None, &mut NullSink)
        .unwrap();

    assert!(count_files(&workflow_dir) <= files_before);
    assert!(count_dirs(&workflow_dir) <= dirs_before);
    assert_eq!(count_files(&workflow_dir), 0);
    match report {
        TerminationReport::Deleted(r) => {
            assert_eq!(r.deleted_count(), 3);
            assert_eq!(r.skipped_count(), 2);
        }
        other => panic!("expected delete report, got {other:?}"),
    }
}

/// Test: Delete on a clean project
/// Given no descriptor at either layout
/// When abort runs in delete mode
/// Then it fails with DescriptorNotFound and leaves files alone
#[test]
fn test_abort_delete_on_clean_project() {
    let project = TestProject::new();
    project.write("docs/workflow/TASK_PLAN.md", "stray plan");

    let result = AbortEngine::default().abort(&project.path, AbortMode::Delete, None, &mut NullSink);
    assert!(matches!(result, Err(Error::DescriptorNotFound(_))));
    assert!(project.exists("docs/workflow/TASK_PLAN.md"));
}

/// Test: Aborted archive
/// Given an active bundle with a report artifact
/// When abort runs in archive mode
/// Then the directory is tagged aborted and holds the report
#[test]
fn test_abort_archive_moves_report() {
    let project = TestProject::new();
    let options = InitOptions {
        task_type: Some(TaskType::Optimization),
        ..Default::default()
    };
    init_engine().init(&project.path, &options, &mut NullSink).unwrap();
    project.write("docs/workflow/ABORT_REPORT.md", "out of budget");

    let report = AbortEngine::new(archive_engine())
        .abort(&project.path, AbortMode::Archive, None, &mut NullSink)
        .unwrap();
    let TerminationReport::Archived(r) = report else {
        panic!("expected archive report");
    };
    assert_eq!(project.archives(), vec!["20261019-optimization-optimization-aborted"]);
    assert_eq!(
        std::fs::read_to_string(r.directory.join("ABORT_REPORT.md")).unwrap(),
        "out of budget"
    );
    assert_eq!(r.moved_count(), 2);
}

/// Test: Custom phases
/// Given a phase override
/// When init runs
/// Then the override replaces the type's plan in order
#[test]
fn test_init_with_custom_phases() {
    let project = TestProject::new();
    let options = InitOptions {
        task_type: Some(TaskType::Migration),
        phase_names: Some(vec!["Audit".to_string(), "Cutover".to_string()]),
        ..Default::default()
    };
    let report = init_engine().init(&project.path, &options, &mut NullSink).unwrap();
    assert_eq!(report.config.task_prefix, "M");
    assert_eq!(report.config.phases.len(), 2);
    assert_eq!(report.config.phases[1].name, "Phase 1: Cutover");
    assert!(report.config.phases.iter().all(|p| p.exit_criteria.is_empty()));

    let empty = InitOptions {
        phase_names: Some(vec![" ".to_string()]),
        force: true,
        ..Default::default()
    };
    let result = init_engine().init(&project.path, &empty, &mut NullSink);
    assert!(matches!(result, Err(Error::Config(_))));
}
