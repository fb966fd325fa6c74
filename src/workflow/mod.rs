//! Workflow bundle data model.
//!
//! This module defines the `workflow.json` descriptor schema, the built-in
//! phase plans per task type, and the initial status document template.

mod descriptor;
mod phases;
mod status_doc;

pub use descriptor::{
    split_list, Constraints, Phase, ProjectContext, StateFiles, StateKey, TaskType,
    WorkflowConfig, SCHEMA_VERSION,
};
pub use phases::PhaseTable;
pub use status_doc::render_status;

/// Project-relative directory of the current layout.
pub const CURRENT_DIR: &str = "docs/workflow";

/// Project-relative directory where legacy bundles kept their state documents.
pub const LEGACY_STATE_DIR: &str = "docs";

/// Project-relative directory where legacy bundles kept the descriptor.
pub const LEGACY_DESCRIPTOR_DIR: &str = ".claude";

pub const DESCRIPTOR_FILE: &str = "workflow.json";

/// Loose report file moved or deleted alongside the state documents.
pub const REPORT_FILE: &str = "ABORT_REPORT.md";

/// Default project-relative archive root.
pub const ARCHIVE_DIR: &str = "docs/workflow/archive";
