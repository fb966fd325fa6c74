//! Moving a finished bundle into an archive directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use super::naming::{archive_base_name, next_free_file_name, next_free_name};
use super::paths::{DescriptorLocation, PathResolver};
use super::report::{ArchiveReport, EventSink, LifecycleEvent, SkipReason};
use crate::workflow::{StateKey, WorkflowConfig, DESCRIPTOR_FILE, REPORT_FILE};
use crate::{wlog, wlog_debug, wlog_warn, Error, Result};

/// Rename, falling back to copy-and-remove when rename is refused (for
/// example across filesystems). The fallback is not atomic.
pub(crate) fn move_file(src: &Path, dst: &Path) -> io::Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            wlog_debug!(
                "rename {} -> {} failed ({}), copying instead",
                src.display(),
                dst.display(),
                rename_err
            );
            fs::copy(src, dst)?;
            fs::remove_file(src)
        }
    }
}

/// Descriptor an archive or abort should act on, plus its parsed contents.
pub(crate) struct ActiveBundle {
    pub location: DescriptorLocation,
    pub config: WorkflowConfig,
    pub shadowed_legacy: Option<PathBuf>,
}

impl ActiveBundle {
    pub fn open(resolver: &PathResolver) -> Result<Self> {
        let state = resolver.bundle_state();
        let location = state
            .authoritative()
            .ok_or_else(|| Error::DescriptorNotFound(resolver.root().to_path_buf()))?;
        let shadowed_legacy = state.shadowed_legacy().map(Path::to_path_buf);
        if let Some(legacy) = &shadowed_legacy {
            wlog_warn!(
                "Descriptors at both layouts; using {} and leaving {}",
                location.path.display(),
                legacy.display()
            );
        }
        let config = WorkflowConfig::load(&location.path)?;
        Ok(Self {
            location,
            config,
            shadowed_legacy,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ArchiveEngine {
    archive_dir: Option<String>,
    date: Option<NaiveDate>,
}

impl ArchiveEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project-relative archive root replacing `docs/workflow/archive`.
    pub fn with_archive_dir(mut self, dir: impl Into<String>) -> Self {
        self.archive_dir = Some(dir.into());
        self
    }

    /// Pin the date used in archive names.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    fn today(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Archive the active bundle of `project_root`.
    ///
    /// Fails with [`Error::DescriptorNotFound`] when there is nothing to
    /// archive, so a second run never produces an empty archive.
    pub fn archive(
        &self,
        project_root: &Path,
        label: Option<&str>,
        sink: &mut dyn EventSink,
    ) -> Result<ArchiveReport> {
        let resolver = PathResolver::new(project_root)?;
        let bundle = ActiveBundle::open(&resolver)?;
        self.archive_bundle(&resolver, bundle, label, false, sink)
    }

    /// Shared by normal completion and aborted archives.
    ///
    /// Order: create the directory, snapshot the descriptor, move each state
    /// document and the report artifact, then remove the original descriptor.
    /// Per-file failures become skips; there is no rollback.
    pub(crate) fn archive_bundle(
        &self,
        resolver: &PathResolver,
        bundle: ActiveBundle,
        label: Option<&str>,
        aborted: bool,
        sink: &mut dyn EventSink,
    ) -> Result<ArchiveReport> {
        let ActiveBundle {
            location,
            config,
            shadowed_legacy,
        } = bundle;
        let sources = resolver.resolve(&config)?;

        let archive_root = resolver.archive_root(self.archive_dir.as_deref())?;
        let base = archive_base_name(
            self.today(),
            config.primary_type,
            label,
            &config.task_name,
            aborted,
        );
        let name = next_free_name(&base, |n| archive_root.join(n).exists());
        let directory = archive_root.join(&name);

        fs::create_dir_all(&directory).map_err(|source| Error::ArchiveDirectory {
            path: directory.clone(),
            source,
        })?;
        wlog!("Archiving {} into {}", resolver.root().display(), directory.display());
        sink.emit(&LifecycleEvent::ArchiveCreated {
            directory: directory.clone(),
        });

        let descriptor_snapshot = directory.join(DESCRIPTOR_FILE);
        fs::copy(&location.path, &descriptor_snapshot)?;
        sink.emit(&LifecycleEvent::DescriptorCopied {
            from: location.path.clone(),
            to: descriptor_snapshot.clone(),
        });

        let mut report = ArchiveReport {
            directory: directory.clone(),
            descriptor_snapshot,
            shadowed_legacy,
            ..Default::default()
        };

        for key in StateKey::ALL {
            let src = &sources[&key];
            if *src == location.path {
                Self::skip(src.clone(), SkipReason::Descriptor, &mut report, sink);
                continue;
            }
            let file_name = src
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| key.file_name().to_string());
            Self::move_one(src, &directory, &file_name, &mut report, sink);
        }

        match resolver.report_artifact() {
            Some(src) => Self::move_one(&src, &directory, REPORT_FILE, &mut report, sink),
            None => Self::skip(
                resolver.default_report_path(),
                SkipReason::Missing,
                &mut report,
                sink,
            ),
        }

        fs::remove_file(&location.path)?;
        wlog!("Removed descriptor {}", location.path.display());
        sink.emit(&LifecycleEvent::DescriptorRemoved {
            path: location.path,
        });

        Ok(report)
    }

    fn move_one(
        src: &Path,
        directory: &Path,
        file_name: &str,
        report: &mut ArchiveReport,
        sink: &mut dyn EventSink,
    ) {
        if !src.exists() {
            Self::skip(src.to_path_buf(), SkipReason::Missing, report, sink);
            return;
        }
        let target = next_free_file_name(file_name, |n| directory.join(n).exists());
        let dst = directory.join(target);
        match move_file(src, &dst) {
            Ok(()) => {
                wlog_debug!("Moved {} -> {}", src.display(), dst.display());
                sink.emit(&LifecycleEvent::Moved {
                    from: src.to_path_buf(),
                    to: dst.clone(),
                });
                report.moved.push((src.to_path_buf(), dst));
            }
            Err(e) => {
                wlog_warn!("Failed to move {}: {}", src.display(), e);
                Self::skip(src.to_path_buf(), SkipReason::Failed(e.to_string()), report, sink);
            }
        }
    }

    fn skip(path: PathBuf, reason: SkipReason, report: &mut ArchiveReport, sink: &mut dyn EventSink) {
        wlog_debug!("Skipped {} ({})", path.display(), reason);
        sink.emit(&LifecycleEvent::Skipped {
            path: path.clone(),
            reason: reason.clone(),
        });
        report.skipped.push((path, reason));
    }
}
