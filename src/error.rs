use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Project directory not found: {}", .0.display())]
    ProjectRootNotFound(PathBuf),

    #[error("workflow.json not found under {}", .0.display())]
    DescriptorNotFound(PathBuf),

    #[error("workflow.json already exists at {}", .0.display())]
    DescriptorExists(PathBuf),

    #[error("Invalid descriptor {}: {reason}", path.display())]
    InvalidDescriptor { path: PathBuf, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Cannot create archive directory {}: {source}", path.display())]
    ArchiveDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No home directory")]
    NoHomeDir,
}

impl Error {
    /// Whether this error means something the command needed does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ProjectRootNotFound(_) | Error::DescriptorNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
