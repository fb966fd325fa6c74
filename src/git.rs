//! Revision capture for the `initCommit` descriptor field.

use std::path::{Path, PathBuf};

use git2::Repository;

use crate::{wlog_debug, Result};

/// Supplies the current revision of a project, or an empty string.
///
/// Implementations must never fail: any problem yields `""`.
pub trait RevisionProvider {
    fn current_revision(&self, project_root: &Path) -> String;
}

/// Thin wrapper over a discovered git repository.
pub struct GitOps {
    repo_path: PathBuf,
}

impl GitOps {
    pub fn new(repo_path: &Path) -> Result<Self> {
        wlog_debug!("GitOps::new path={}", repo_path.display());
        let _ = Repository::discover(repo_path)?;
        Ok(Self {
            repo_path: repo_path.to_path_buf(),
        })
    }

    fn repo(&self) -> Result<Repository> {
        Ok(Repository::discover(&self.repo_path)?)
    }

    pub fn head_commit(&self) -> Result<String> {
        let repo = self.repo()?;
        let head = repo.head()?;
        let commit = head.peel_to_commit()?;
        Ok(commit.id().to_string())
    }
}

/// Reads `HEAD` through libgit2.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitRevision;

impl RevisionProvider for GitRevision {
    fn current_revision(&self, project_root: &Path) -> String {
        match GitOps::new(project_root).and_then(|ops| ops.head_commit()) {
            Ok(sha) => sha,
            Err(e) => {
                wlog_debug!(
                    "No revision for {}: {}",
                    project_root.display(),
                    e
                );
                String::new()
            }
        }
    }
}

/// Used when revision capture is disabled in settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRevision;

impl RevisionProvider for NoRevision {
    fn current_revision(&self, _project_root: &Path) -> String {
        String::new()
    }
}

/// Always returns the given string.
#[derive(Debug, Clone, Default)]
pub struct FixedRevision(pub String);

impl RevisionProvider for FixedRevision {
    fn current_revision(&self, _project_root: &Path) -> String {
        self.0.clone()
    }
}
