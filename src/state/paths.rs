//! Locating the descriptor and state documents across storage layouts.
//!
//! Every lookup walks an ordered candidate list and takes the first path
//! that exists; callers never branch on which layout matched.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::workflow::{
    StateKey, WorkflowConfig, ARCHIVE_DIR, CURRENT_DIR, DESCRIPTOR_FILE, LEGACY_DESCRIPTOR_DIR,
    LEGACY_STATE_DIR, REPORT_FILE,
};
use crate::{wlog_debug, wlog_trace, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `docs/workflow/`
    Current,
    /// `.claude/workflow.json` with documents under `docs/`
    Legacy,
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layout::Current => write!(f, "current"),
            Layout::Legacy => write!(f, "legacy"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorLocation {
    pub path: PathBuf,
    pub layout: Layout,
}

/// Where the lifecycle of a project root currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleState {
    Absent,
    Active(DescriptorLocation),
    /// Descriptors exist at both layouts. The current one is authoritative.
    Inconsistent { current: PathBuf, legacy: PathBuf },
}

impl BundleState {
    /// The descriptor an engine should act on, if any.
    pub fn authoritative(&self) -> Option<DescriptorLocation> {
        match self {
            BundleState::Absent => None,
            BundleState::Active(location) => Some(location.clone()),
            BundleState::Inconsistent { current, .. } => Some(DescriptorLocation {
                path: current.clone(),
                layout: Layout::Current,
            }),
        }
    }

    /// A legacy descriptor hidden behind the current one.
    pub fn shadowed_legacy(&self) -> Option<&Path> {
        match self {
            BundleState::Inconsistent { legacy, .. } => Some(legacy),
            _ => None,
        }
    }
}

fn first_existing(candidates: &[PathBuf]) -> Option<&PathBuf> {
    candidates.iter().find(|p| {
        wlog_trace!("candidate {} exists={}", p.display(), p.exists());
        p.exists()
    })
}

/// Join a descriptor-supplied relative path onto `root`, refusing paths that
/// could leave the project.
fn join_relative(root: &Path, rel: &str) -> Result<PathBuf> {
    let rel_path = Path::new(rel);
    let escapes = rel_path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if rel.trim().is_empty() || escapes {
        return Err(Error::Config(format!(
            "state file path must stay inside the project root: {rel:?}"
        )));
    }
    Ok(root.join(rel_path))
}

/// Resolves logical keys to concrete paths under one project root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Fails with [`Error::ProjectRootNotFound`] unless `root` is a directory.
    pub fn new(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::ProjectRootNotFound(root.to_path_buf()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn current_dir(&self) -> PathBuf {
        self.root.join(CURRENT_DIR)
    }

    pub fn current_descriptor(&self) -> PathBuf {
        self.current_dir().join(DESCRIPTOR_FILE)
    }

    pub fn legacy_descriptor(&self) -> PathBuf {
        self.root.join(LEGACY_DESCRIPTOR_DIR).join(DESCRIPTOR_FILE)
    }

    /// First existing descriptor, current layout before legacy.
    pub fn locate_descriptor(&self) -> Option<DescriptorLocation> {
        let candidates = [
            (Layout::Current, self.current_descriptor()),
            (Layout::Legacy, self.legacy_descriptor()),
        ];
        let found = candidates
            .into_iter()
            .find(|(_, path)| path.exists())
            .map(|(layout, path)| DescriptorLocation { path, layout });
        wlog_debug!(
            "locate_descriptor root={} found={:?}",
            self.root.display(),
            found
        );
        found
    }

    /// Like [`locate_descriptor`](Self::locate_descriptor), but also reports a
    /// descriptor present at both layouts.
    pub fn bundle_state(&self) -> BundleState {
        let current = self.current_descriptor();
        let legacy = self.legacy_descriptor();
        match (current.exists(), legacy.exists()) {
            (true, true) => BundleState::Inconsistent { current, legacy },
            (true, false) => BundleState::Active(DescriptorLocation {
                path: current,
                layout: Layout::Current,
            }),
            (false, true) => BundleState::Active(DescriptorLocation {
                path: legacy,
                layout: Layout::Legacy,
            }),
            (false, false) => BundleState::Absent,
        }
    }

    /// Path of one state document.
    ///
    /// An explicit `stateFiles` entry is used as-is. Otherwise the current
    /// default is used, unless only the legacy default exists.
    pub fn resolve_key(&self, config: &WorkflowConfig, key: StateKey) -> Result<PathBuf> {
        if let Some(rel) = config.state_files.get(key) {
            return join_relative(&self.root, rel);
        }
        let candidates = [
            self.current_dir().join(key.file_name()),
            self.root.join(LEGACY_STATE_DIR).join(key.file_name()),
        ];
        Ok(first_existing(&candidates)
            .unwrap_or(&candidates[0])
            .clone())
    }

    /// Paths for all four logical keys.
    pub fn resolve(&self, config: &WorkflowConfig) -> Result<BTreeMap<StateKey, PathBuf>> {
        StateKey::ALL
            .into_iter()
            .map(|key| Ok((key, self.resolve_key(config, key)?)))
            .collect()
    }

    /// The loose report artifact, if one exists at either layout.
    pub fn report_artifact(&self) -> Option<PathBuf> {
        let candidates = [
            self.current_dir().join(REPORT_FILE),
            self.root.join(LEGACY_STATE_DIR).join(REPORT_FILE),
        ];
        first_existing(&candidates).cloned()
    }

    /// Where the report artifact is expected when it does not exist.
    pub fn default_report_path(&self) -> PathBuf {
        self.current_dir().join(REPORT_FILE)
    }

    pub fn archive_root(&self, override_dir: Option<&str>) -> Result<PathBuf> {
        join_relative(&self.root, override_dir.unwrap_or(ARCHIVE_DIR))
    }

    /// `path` relative to the project root, for display.
    pub fn display_path<'a>(&self, path: &'a Path) -> std::borrow::Cow<'a, str> {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
    }
}
