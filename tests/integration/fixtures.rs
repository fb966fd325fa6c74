//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Creating temporary project roots
//! - Seeding current and legacy bundles
//! - Counting files under a directory

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tempfile::TempDir;

use workstate::git::FixedRevision;
use workstate::{ArchiveEngine, InitEngine, PhaseTable};

pub const FIXED_DATE: (i32, u32, u32) = (2026, 10, 19);

pub fn fixed_date() -> NaiveDate {
    let (y, m, d) = FIXED_DATE;
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// A temporary project root.
pub struct TestProject {
    /// Kept alive for the lifetime of the fixture.
    pub temp_dir: TempDir,
    pub path: PathBuf,
}

impl TestProject {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().to_path_buf();
        fs::write(path.join("README.md"), "# Test Project\n").expect("Failed to write README");
        Self { temp_dir, path }
    }

    /// Write `content` at a project-relative path, creating parents.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.path.join(rel).exists()
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.path.join(rel)).expect("Failed to read file")
    }

    /// Names of directories under the default archive root, sorted.
    pub fn archives(&self) -> Vec<String> {
        let root = self.path.join("docs/workflow/archive");
        if !root.exists() {
            return Vec::new();
        }
        let mut names: Vec<String> = fs::read_dir(root)
            .expect("Failed to read archive root")
            .flatten()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Init engine with a fixed revision and date.
pub fn init_engine() -> InitEngine {
    InitEngine::new(
        PhaseTable::builtin(),
        Box::new(FixedRevision("0123456789abcdef".to_string())),
    )
    .with_date(fixed_date())
}

pub fn archive_engine() -> ArchiveEngine {
    ArchiveEngine::new().with_date(fixed_date())
}

/// Count regular files under `dir`, recursively. Missing dir counts as zero.
pub fn count_files(dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|e| {
            let path = e.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

/// Count directories under `dir`, recursively, including `dir` itself.
pub fn count_dirs(dir: &Path) -> usize {
    if !dir.is_dir() {
        return 0;
    }
    1 + fs::read_dir(dir)
        .map(|entries| entries.flatten().map(|e| count_dirs(&e.path())).sum())
        .unwrap_or(0)
}
