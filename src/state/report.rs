//! Audit trail of lifecycle operations.
//!
//! Engines hand every step to an [`EventSink`] as it happens, and also
//! collect it into a report returned at the end.

use std::path::{Path, PathBuf};

use crate::workflow::WorkflowConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Nothing at the resolved path.
    Missing,
    /// The move or delete failed; the file was left in place.
    Failed(String),
    /// A `stateFiles` entry names the descriptor, which is handled last.
    Descriptor,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Missing => write!(f, "not found"),
            SkipReason::Failed(reason) => write!(f, "failed: {reason}"),
            SkipReason::Descriptor => write!(f, "is the descriptor"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Written { path: PathBuf },
    Kept { path: PathBuf },
    LegacyRemoved { path: PathBuf },
    ArchiveCreated { directory: PathBuf },
    DescriptorCopied { from: PathBuf, to: PathBuf },
    Moved { from: PathBuf, to: PathBuf },
    Deleted { path: PathBuf },
    Skipped { path: PathBuf, reason: SkipReason },
    DescriptorRemoved { path: PathBuf },
}

/// Receives lifecycle events in the order they happen.
pub trait EventSink {
    fn emit(&mut self, event: &LifecycleEvent);
}

impl EventSink for Vec<LifecycleEvent> {
    fn emit(&mut self, event: &LifecycleEvent) {
        self.push(event.clone());
    }
}

/// Discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &LifecycleEvent) {}
}

/// Result of `init`.
#[derive(Debug, Clone)]
pub struct InitReport {
    pub config: WorkflowConfig,
    pub descriptor_path: PathBuf,
    pub status_path: PathBuf,
    /// False when a status document already existed and was kept.
    pub status_written: bool,
    /// Descriptor that existed before a forced init.
    pub replaced: Option<PathBuf>,
    pub removed_legacy: Option<PathBuf>,
}

impl InitReport {
    /// State documents this init created (the descriptor is not one).
    pub fn state_files_written(&self) -> usize {
        usize::from(self.status_written)
    }
}

/// Result of archiving a bundle.
#[derive(Debug, Clone, Default)]
pub struct ArchiveReport {
    pub directory: PathBuf,
    pub moved: Vec<(PathBuf, PathBuf)>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub descriptor_snapshot: PathBuf,
    /// Legacy descriptor left untouched because a current one also existed.
    pub shadowed_legacy: Option<PathBuf>,
}

impl ArchiveReport {
    pub fn moved_count(&self) -> usize {
        self.moved.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn failed_count(&self) -> usize {
        self.skipped
            .iter()
            .filter(|(_, r)| matches!(r, SkipReason::Failed(_)))
            .count()
    }
}

/// Result of deleting a bundle.
#[derive(Debug, Clone, Default)]
pub struct DeleteReport {
    pub deleted: Vec<PathBuf>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
    pub descriptor: PathBuf,
    pub shadowed_legacy: Option<PathBuf>,
}

impl DeleteReport {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Result of `abort` in either mode.
#[derive(Debug, Clone)]
pub enum TerminationReport {
    Archived(ArchiveReport),
    Deleted(DeleteReport),
}

impl TerminationReport {
    pub fn skipped_count(&self) -> usize {
        match self {
            TerminationReport::Archived(r) => r.skipped_count(),
            TerminationReport::Deleted(r) => r.skipped_count(),
        }
    }

    pub fn shadowed_legacy(&self) -> Option<&Path> {
        match self {
            TerminationReport::Archived(r) => r.shadowed_legacy.as_deref(),
            TerminationReport::Deleted(r) => r.shadowed_legacy.as_deref(),
        }
    }
}
