//! Creating a new workflow bundle.

use std::fs;
use std::path::Path;

use chrono::{Local, NaiveDate};

use super::paths::PathResolver;
use super::report::{EventSink, InitReport, LifecycleEvent};
use crate::git::RevisionProvider;
use crate::workflow::{
    render_status, Constraints, PhaseTable, ProjectContext, StateFiles, StateKey, TaskType,
    WorkflowConfig, SCHEMA_VERSION,
};
use crate::{wlog, wlog_debug, Error, Result};

/// Caller choices for a new bundle. Unset fields take built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub task_type: Option<TaskType>,
    pub task_name: Option<String>,
    pub tags: Vec<String>,
    pub max_files_per_task: Option<u32>,
    pub max_hours_per_task: Option<u32>,
    pub prefix: Option<String>,
    pub phase_names: Option<Vec<String>>,
    pub description: String,
    pub build_command: String,
    pub test_command: String,
    /// Replace an existing descriptor instead of reporting it.
    pub force: bool,
}

pub struct InitEngine {
    phases: PhaseTable,
    revision: Box<dyn RevisionProvider>,
    constraints: Constraints,
    date: Option<NaiveDate>,
}

impl InitEngine {
    pub fn new(phases: PhaseTable, revision: Box<dyn RevisionProvider>) -> Self {
        Self {
            phases,
            revision,
            constraints: Constraints::default(),
            date: None,
        }
    }

    /// Constraints used when the options leave them unset.
    pub fn with_default_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Pin the creation date written into the status document.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Build the descriptor for `options` without touching the filesystem.
    /// `initCommit` is left empty.
    pub fn build_config(&self, options: &InitOptions) -> Result<WorkflowConfig> {
        let primary_type = options.task_type.unwrap_or_default();
        let constraints = Constraints::new(
            options
                .max_files_per_task
                .unwrap_or(self.constraints.max_files_per_task),
            options
                .max_hours_per_task
                .unwrap_or(self.constraints.max_hours_per_task),
        )?;
        let task_prefix = match options.prefix.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => p.to_string(),
            _ => self.phases.prefix_for(primary_type),
        };
        let phases = self
            .phases
            .phases_for(primary_type, options.phase_names.as_deref())?;

        Ok(WorkflowConfig {
            version: SCHEMA_VERSION.to_string(),
            init_commit: String::new(),
            task_name: options.task_name.clone().unwrap_or_default(),
            primary_type,
            secondary_tags: options.tags.clone(),
            task_prefix,
            constraints,
            state_files: StateFiles::current_defaults(),
            phases,
            project_context: ProjectContext {
                description: options.description.clone(),
                build_command: options.build_command.clone(),
                test_command: options.test_command.clone(),
            },
        })
    }

    /// Write a new descriptor and, if none exists yet, a status document.
    ///
    /// An existing descriptor at either layout yields
    /// [`Error::DescriptorExists`] unless `options.force` is set; nothing is
    /// written in that case. With `force`, a legacy descriptor is removed
    /// once the new one is in place.
    pub fn init(
        &self,
        project_root: &Path,
        options: &InitOptions,
        sink: &mut dyn EventSink,
    ) -> Result<InitReport> {
        let resolver = PathResolver::new(project_root)?;
        let mut config = self.build_config(options)?;

        let existing = resolver.locate_descriptor();
        if let Some(found) = &existing {
            if !options.force {
                wlog_debug!("init refused: descriptor exists at {}", found.path.display());
                return Err(Error::DescriptorExists(found.path.clone()));
            }
            wlog!("init --force replacing {}", found.path.display());
        }

        fs::create_dir_all(resolver.current_dir())?;

        config.init_commit = self.revision.current_revision(project_root);

        let descriptor_path = resolver.current_descriptor();
        config.save(&descriptor_path)?;
        wlog!("Wrote descriptor {}", descriptor_path.display());
        sink.emit(&LifecycleEvent::Written {
            path: descriptor_path.clone(),
        });

        let legacy = resolver.legacy_descriptor();
        let removed_legacy = if existing.is_some() && legacy.exists() && legacy != descriptor_path {
            fs::remove_file(&legacy)?;
            wlog!("Removed legacy descriptor {}", legacy.display());
            sink.emit(&LifecycleEvent::LegacyRemoved {
                path: legacy.clone(),
            });
            Some(legacy)
        } else {
            None
        };

        let status_path = resolver.resolve_key(&config, StateKey::Status)?;
        let status_written = if status_path.exists() {
            wlog_debug!("Keeping existing status document {}", status_path.display());
            sink.emit(&LifecycleEvent::Kept {
                path: status_path.clone(),
            });
            false
        } else {
            if let Some(parent) = status_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let created = self.date.unwrap_or_else(|| Local::now().date_naive());
            fs::write(&status_path, render_status(&config, created))?;
            wlog_debug!("Wrote status document {}", status_path.display());
            sink.emit(&LifecycleEvent::Written {
                path: status_path.clone(),
            });
            true
        };

        Ok(InitReport {
            config,
            descriptor_path,
            status_path,
            status_written,
            replaced: existing.map(|e| e.path),
            removed_legacy,
        })
    }
}
