//! `initCommit` capture against real repositories.

use git2::{Repository, Signature};

use workstate::git::{GitRevision, NoRevision};
use workstate::state::NullSink;
use workstate::{InitEngine, InitOptions, PhaseTable};

use super::fixtures::{fixed_date, TestProject};

fn commit_all(repo: &Repository, message: &str) -> String {
    let sig = Signature::now("Test", "test@example.com").unwrap();
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let parents: Vec<git2::Commit> = repo
        .head()
        .ok()
        .and_then(|h| h.peel_to_commit().ok())
        .into_iter()
        .collect();
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
        .to_string()
}

/// Test: Revision stamped
/// Given a git repository with a commit
/// When init runs with the git provider
/// Then initCommit is the HEAD sha
#[test]
fn test_init_stamps_head_commit() {
    let project = TestProject::new();
    let repo = Repository::init(&project.path).unwrap();
    let sha = commit_all(&repo, "Initial commit");

    let engine = InitEngine::new(PhaseTable::builtin(), Box::new(GitRevision)).with_date(fixed_date());
    let report = engine
        .init(&project.path, &InitOptions::default(), &mut NullSink)
        .unwrap();
    assert_eq!(report.config.init_commit, sha);
}

/// Test: No commits yet
/// Given a repository with an unborn HEAD
/// When init runs
/// Then initCommit is empty and init still succeeds
#[test]
fn test_init_with_unborn_head() {
    let project = TestProject::new();
    Repository::init(&project.path).unwrap();

    let engine = InitEngine::new(PhaseTable::builtin(), Box::new(GitRevision)).with_date(fixed_date());
    let report = engine
        .init(&project.path, &InitOptions::default(), &mut NullSink)
        .unwrap();
    assert_eq!(report.config.init_commit, "");
}

/// Test: Capture disabled
/// Given a repository with a commit
/// When init runs with the disabled provider
/// Then initCommit is empty
#[test]
fn test_init_with_capture_disabled() {
    let project = TestProject::new();
    let repo = Repository::init(&project.path).unwrap();
    commit_all(&repo, "Initial commit");

    let engine = InitEngine::new(PhaseTable::builtin(), Box::new(NoRevision));
    let report = engine
        .init(&project.path, &InitOptions::default(), &mut NullSink)
        .unwrap();
    assert!(report.config.init_commit.is_empty());
}
