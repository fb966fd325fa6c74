//! Lifecycle manager for a project's workflow state bundle: a `workflow.json`
//! descriptor plus markdown tracking documents under `docs/workflow/`.

pub mod config;
pub mod error;
pub mod git;
pub mod log;
pub mod state;
pub mod workflow;

pub use error::{Error, Result};
pub use state::{AbortEngine, AbortMode, ArchiveEngine, InitEngine, InitOptions, PathResolver};
pub use workflow::{PhaseTable, TaskType, WorkflowConfig};
