//! Lifecycle of the workflow state bundle.
//!
//! A bundle goes `ABSENT -> ACTIVE` through [`InitEngine`], then ends through
//! [`ArchiveEngine`] or [`AbortEngine`]. All operations are synchronous and
//! assume nothing else touches the project root while they run.

mod abort;
mod archive;
mod init;
mod naming;
mod paths;
mod report;

pub use abort::{AbortEngine, AbortMode};
pub use archive::ArchiveEngine;
pub use init::{InitEngine, InitOptions};
pub use naming::{archive_base_name, next_free_file_name, next_free_name, slugify};
pub use paths::{BundleState, DescriptorLocation, Layout, PathResolver};
pub use report::{
    ArchiveReport, DeleteReport, EventSink, InitReport, LifecycleEvent, NullSink, SkipReason,
    TerminationReport,
};

use std::path::{Path, PathBuf};

use crate::workflow::{StateKey, WorkflowConfig};
use crate::Result;

/// Read-only snapshot of a project's bundle.
#[derive(Debug, Clone)]
pub struct BundleStatus {
    pub state: BundleState,
    pub config: Option<WorkflowConfig>,
    /// Resolved path of each state document and whether it exists.
    pub files: Vec<(StateKey, PathBuf, bool)>,
    pub report_artifact: Option<PathBuf>,
}

/// Inspect `project_root` without changing anything.
pub fn inspect(project_root: &Path) -> Result<BundleStatus> {
    let resolver = PathResolver::new(project_root)?;
    let state = resolver.bundle_state();
    let config = state
        .authoritative()
        .map(|location| WorkflowConfig::load(&location.path))
        .transpose()?;
    let files = resolver
        .resolve(config.as_ref().unwrap_or(&WorkflowConfig::default()))?
        .into_iter()
        .map(|(key, path)| {
            let exists = path.exists();
            (key, path, exists)
        })
        .collect();
    Ok(BundleStatus {
        state,
        config,
        files,
        report_artifact: resolver.report_artifact(),
    })
}
