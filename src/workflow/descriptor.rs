//! The `workflow.json` descriptor schema.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::{DEFAULT_MAX_FILES_PER_TASK, DEFAULT_MAX_HOURS_PER_TASK};
use crate::{wlog_trace, wlog_warn, Error, Result};

/// Schema version stamped by `init`.
pub const SCHEMA_VERSION: &str = "1.1";

/// Kind of large task a workflow bundle tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Feature,
    Refactor,
    Migration,
    Integration,
    Optimization,
    Bugfix,
    Infrastructure,
    #[default]
    Generic,
}

impl TaskType {
    pub const ALL: [TaskType; 8] = [
        TaskType::Feature,
        TaskType::Refactor,
        TaskType::Migration,
        TaskType::Integration,
        TaskType::Optimization,
        TaskType::Bugfix,
        TaskType::Infrastructure,
        TaskType::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Feature => "feature",
            TaskType::Refactor => "refactor",
            TaskType::Migration => "migration",
            TaskType::Integration => "integration",
            TaskType::Optimization => "optimization",
            TaskType::Bugfix => "bugfix",
            TaskType::Infrastructure => "infrastructure",
            TaskType::Generic => "generic",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::Config(format!("unknown task type: {s}")))
    }
}

/// Descriptors written by other tools may carry a type this build does not
/// know; they are still archivable, so read them as `generic`.
fn lenient_task_type<'de, D>(deserializer: D) -> std::result::Result<TaskType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.parse().unwrap_or_else(|_| {
        wlog_warn!("Unknown primaryType {:?} in descriptor, treating as generic", raw);
        TaskType::Generic
    }))
}

/// Logical identifier of one tracking document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateKey {
    Analysis,
    Plan,
    Status,
    DependencyMap,
}

impl StateKey {
    /// All keys in archive/delete processing order.
    pub const ALL: [StateKey; 4] = [
        StateKey::Analysis,
        StateKey::Plan,
        StateKey::Status,
        StateKey::DependencyMap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StateKey::Analysis => "analysis",
            StateKey::Plan => "plan",
            StateKey::Status => "status",
            StateKey::DependencyMap => "dependencyMap",
        }
    }

    /// Built-in file name for this key.
    pub fn file_name(&self) -> &'static str {
        match self {
            StateKey::Analysis => "TASK_ANALYSIS.md",
            StateKey::Plan => "TASK_PLAN.md",
            StateKey::Status => "TASK_STATUS.md",
            StateKey::DependencyMap => "DEPENDENCY_MAP.md",
        }
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-key overrides of state document locations, relative to the project root.
///
/// A plain struct rather than a map so that serialization order is fixed and
/// the order entries appear in on disk has no effect on lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateFiles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_map: Option<String>,
}

impl StateFiles {
    pub fn get(&self, key: StateKey) -> Option<&str> {
        match key {
            StateKey::Analysis => self.analysis.as_deref(),
            StateKey::Plan => self.plan.as_deref(),
            StateKey::Status => self.status.as_deref(),
            StateKey::DependencyMap => self.dependency_map.as_deref(),
        }
    }

    pub fn set(&mut self, key: StateKey, path: impl Into<String>) {
        let slot = match key {
            StateKey::Analysis => &mut self.analysis,
            StateKey::Plan => &mut self.plan,
            StateKey::Status => &mut self.status,
            StateKey::DependencyMap => &mut self.dependency_map,
        };
        *slot = Some(path.into());
    }

    /// Explicit entries for every key pointing at the current layout.
    pub fn current_defaults() -> Self {
        let mut files = Self::default();
        for key in StateKey::ALL {
            files.set(key, format!("{}/{}", super::CURRENT_DIR, key.file_name()));
        }
        files
    }
}

/// Per-task limits. A missing key falls back to its default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Constraints {
    pub max_files_per_task: u32,
    pub max_hours_per_task: u32,
}

impl Constraints {
    pub fn new(max_files_per_task: u32, max_hours_per_task: u32) -> Result<Self> {
        if max_files_per_task == 0 || max_hours_per_task == 0 {
            return Err(Error::Config(
                "maxFilesPerTask and maxHoursPerTask must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            max_files_per_task,
            max_hours_per_task,
        })
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            max_files_per_task: DEFAULT_MAX_FILES_PER_TASK,
            max_hours_per_task: DEFAULT_MAX_HOURS_PER_TASK,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Phase {
    pub name: String,
    pub exit_criteria: String,
}

impl Phase {
    pub fn new(name: impl Into<String>, exit_criteria: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exit_criteria: exit_criteria.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectContext {
    pub description: String,
    pub build_command: String,
    pub test_command: String,
}

/// Descriptor of one active workflow lifecycle.
///
/// Field order here is the on-disk key order. Every field has a default so
/// that hand-edited or legacy descriptors with missing keys still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowConfig {
    pub version: String,
    pub init_commit: String,
    pub task_name: String,
    #[serde(deserialize_with = "lenient_task_type")]
    pub primary_type: TaskType,
    pub secondary_tags: Vec<String>,
    pub task_prefix: String,
    pub constraints: Constraints,
    pub state_files: StateFiles,
    pub phases: Vec<Phase>,
    pub project_context: ProjectContext,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            init_commit: String::new(),
            task_name: String::new(),
            primary_type: TaskType::Generic,
            secondary_tags: Vec::new(),
            task_prefix: String::new(),
            constraints: Constraints::default(),
            state_files: StateFiles::default(),
            phases: Vec::new(),
            project_context: ProjectContext::default(),
        }
    }
}

impl WorkflowConfig {
    /// Read a descriptor, reporting malformed JSON as a config error.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| Error::InvalidDescriptor {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        wlog_trace!("Loaded descriptor {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Serialize with two-space indentation and a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Split a comma separated list, trimming entries and dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
