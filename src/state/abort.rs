//! Ending a bundle early, by archiving it as aborted or deleting it.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::archive::{ActiveBundle, ArchiveEngine};
use super::paths::PathResolver;
use super::report::{DeleteReport, EventSink, LifecycleEvent, SkipReason, TerminationReport};
use crate::workflow::StateKey;
use crate::{wlog, wlog_debug, wlog_warn, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortMode {
    /// Move into an archive directory tagged `-aborted`.
    Archive,
    /// Remove every bundle file. Irreversible.
    Delete,
}

impl FromStr for AbortMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "archive" => Ok(AbortMode::Archive),
            "delete" => Ok(AbortMode::Delete),
            other => Err(Error::Config(format!("unknown abort mode: {other}"))),
        }
    }
}

/// Terminates a bundle without completing it.
///
/// The engine never asks for confirmation; callers gate `Delete` themselves.
#[derive(Debug, Clone, Default)]
pub struct AbortEngine {
    archive: ArchiveEngine,
}

impl AbortEngine {
    pub fn new(archive: ArchiveEngine) -> Self {
        Self { archive }
    }

    pub fn abort(
        &self,
        project_root: &Path,
        mode: AbortMode,
        label: Option<&str>,
        sink: &mut dyn EventSink,
    ) -> Result<TerminationReport> {
        let resolver = PathResolver::new(project_root)?;
        let bundle = ActiveBundle::open(&resolver)?;
        wlog!("Aborting {} mode={:?}", project_root.display(), mode);
        match mode {
            AbortMode::Archive => self
                .archive
                .archive_bundle(&resolver, bundle, label, true, sink)
                .map(TerminationReport::Archived),
            AbortMode::Delete => {
                Self::delete_bundle(&resolver, bundle, sink).map(TerminationReport::Deleted)
            }
        }
    }

    fn delete_bundle(
        resolver: &PathResolver,
        bundle: ActiveBundle,
        sink: &mut dyn EventSink,
    ) -> Result<DeleteReport> {
        let targets = resolver.resolve(&bundle.config)?;
        let mut report = DeleteReport {
            descriptor: bundle.location.path.clone(),
            shadowed_legacy: bundle.shadowed_legacy,
            ..Default::default()
        };

        for key in StateKey::ALL {
            let target = targets[&key].clone();
            if target == bundle.location.path {
                Self::record_skip(target, SkipReason::Descriptor, &mut report, sink);
                continue;
            }
            Self::delete_one(target, &mut report, sink);
        }
        let report_artifact = resolver
            .report_artifact()
            .unwrap_or_else(|| resolver.default_report_path());
        Self::delete_one(report_artifact, &mut report, sink);

        fs::remove_file(&bundle.location.path)?;
        wlog!("Deleted descriptor {}", bundle.location.path.display());
        sink.emit(&LifecycleEvent::DescriptorRemoved {
            path: bundle.location.path,
        });

        Ok(report)
    }

    fn delete_one(path: PathBuf, report: &mut DeleteReport, sink: &mut dyn EventSink) {
        let reason = if !path.exists() {
            SkipReason::Missing
        } else {
            match fs::remove_file(&path) {
                Ok(()) => {
                    wlog_debug!("Deleted {}", path.display());
                    sink.emit(&LifecycleEvent::Deleted { path: path.clone() });
                    report.deleted.push(path);
                    return;
                }
                Err(e) => {
                    wlog_warn!("Failed to delete {}: {}", path.display(), e);
                    SkipReason::Failed(e.to_string())
                }
            }
        };
        Self::record_skip(path, reason, report, sink);
    }

    fn record_skip(
        path: PathBuf,
        reason: SkipReason,
        report: &mut DeleteReport,
        sink: &mut dyn EventSink,
    ) {
        sink.emit(&LifecycleEvent::Skipped {
            path: path.clone(),
            reason: reason.clone(),
        });
        report.skipped.push((path, reason));
    }
}
