use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use workstate::config::Config;
use workstate::git::{GitRevision, NoRevision, RevisionProvider};
use workstate::state::{
    inspect, BundleState, EventSink, LifecycleEvent, TerminationReport,
};
use workstate::workflow::{split_list, Constraints};
use workstate::{
    wlog, wlog_error, AbortEngine, AbortMode, ArchiveEngine, Error, InitEngine, InitOptions,
    PhaseTable, Result, TaskType,
};

/// Workstate - manage the workflow state bundle of a project
#[derive(Parser, Debug)]
#[command(name = "workstate")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    WORKSTATE_DEBUG=1     Enable debug logging (alternative to --debug)\n    WORKSTATE_LOG=<lvl>   Force a log level (error|warn|info|debug|trace)")]
pub struct Cli {
    /// Enable debug logging (writes to ~/.workstate/workstate.log)
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Create workflow.json and a TASK_STATUS.md template
    Init {
        /// Project root directory
        #[arg(long)]
        path: PathBuf,

        /// Task type: feature, refactor, migration, integration, optimization,
        /// bugfix, infrastructure or generic (defaults to generic)
        #[arg(long = "type")]
        task_type: Option<TaskType>,

        /// Task name slug, e.g. extract-auth-module
        #[arg(long)]
        task_name: Option<String>,

        /// Extra tags, comma separated
        #[arg(long, default_value = "")]
        tags: String,

        /// Maximum files per task
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_files: Option<u32>,

        /// Maximum hours per task
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_hours: Option<u32>,

        /// Task number prefix (defaults per type)
        #[arg(long)]
        prefix: Option<String>,

        /// Custom phase names, comma separated
        #[arg(long)]
        phases: Option<String>,

        /// Short project description
        #[arg(long, default_value = "")]
        description: String,

        /// Build command
        #[arg(long, default_value = "")]
        build_cmd: String,

        /// Test command
        #[arg(long, default_value = "")]
        test_cmd: String,

        /// Overwrite an existing workflow.json without asking
        #[arg(long)]
        force: bool,
    },

    /// Move state files into docs/workflow/archive and remove workflow.json
    Archive {
        /// Project root directory
        #[arg(long)]
        path: PathBuf,

        /// Archive label (defaults to task name, then task type)
        #[arg(long)]
        label: Option<String>,
    },

    /// End the workflow early by archiving (tagged aborted) or deleting
    Abort {
        /// Project root directory
        #[arg(long)]
        path: PathBuf,

        /// archive or delete
        #[arg(long)]
        mode: AbortMode,

        /// Archive label (archive mode only)
        #[arg(long)]
        label: Option<String>,
    },

    /// Show where the bundle lives and which state files exist
    Status {
        /// Project root directory
        #[arg(long)]
        path: PathBuf,
    },
}

/// Prints each lifecycle event as it happens, relative to the project root.
struct ConsoleSink {
    root: PathBuf,
}

impl ConsoleSink {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn rel(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

impl EventSink for ConsoleSink {
    fn emit(&mut self, event: &LifecycleEvent) {
        match event {
            LifecycleEvent::Written { path } => println!("✓ Created: {}", self.rel(path)),
            LifecycleEvent::Kept { path } => println!("⚠ Skipped (exists): {}", self.rel(path)),
            LifecycleEvent::LegacyRemoved { path } => {
                println!("✓ Removed legacy file: {}", self.rel(path))
            }
            LifecycleEvent::ArchiveCreated { directory } => {
                println!("Archive directory: {}", self.rel(directory))
            }
            LifecycleEvent::DescriptorCopied { to, .. } => {
                println!("  ✓ Snapshot: {}", self.rel(to))
            }
            LifecycleEvent::Moved { from, to } => {
                println!("  ✓ Moved: {} → {}", self.rel(from), self.rel(to))
            }
            LifecycleEvent::Deleted { path } => println!("  ✓ Deleted: {}", self.rel(path)),
            LifecycleEvent::Skipped { path, reason } => {
                println!("  - Skipped ({}): {}", reason, self.rel(path))
            }
            LifecycleEvent::DescriptorRemoved { path } => {
                println!("  ✓ Removed: {}", self.rel(path))
            }
        }
        let _ = io::stdout().flush();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    workstate::log::init_with_debug(cli.debug);
    wlog!("workstate {:?}", cli.command);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            wlog_error!("{}", e);
            eprintln!("Error: {e}");
            if e.is_not_found() {
                eprintln!("Hint: the project may not be initialized, or was already archived.");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Init {
            path,
            task_type,
            task_name,
            tags,
            max_files,
            max_hours,
            prefix,
            phases,
            description,
            build_cmd,
            test_cmd,
            force,
        } => {
            let options = InitOptions {
                task_type,
                task_name,
                tags: split_list(&tags),
                max_files_per_task: max_files,
                max_hours_per_task: max_hours,
                prefix,
                phase_names: phases.as_deref().map(split_list),
                description,
                build_command: build_cmd,
                test_command: test_cmd,
                force,
            };
            run_init(&project_root(&path)?, options, &Config::load()?)
        }
        Command::Archive { path, label } => {
            run_archive(&project_root(&path)?, label, &Config::load()?)
        }
        Command::Abort { path, mode, label } => {
            run_abort(&project_root(&path)?, mode, label, &Config::load()?)
        }
        Command::Status { path } => run_status(&project_root(&path)?),
    }
}

/// Absolute form of a user-supplied project path.
fn project_root(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(Error::ProjectRootNotFound(path.to_path_buf()));
    }
    Ok(path.canonicalize()?)
}

fn archive_engine(settings: &Config) -> ArchiveEngine {
    match &settings.archive_dir {
        Some(dir) => ArchiveEngine::new().with_archive_dir(dir.clone()),
        None => ArchiveEngine::new(),
    }
}

fn run_init(root: &Path, mut options: InitOptions, settings: &Config) -> Result<()> {
    let revision: Box<dyn RevisionProvider> = if settings.effective_capture_revision() {
        Box::new(GitRevision)
    } else {
        Box::new(NoRevision)
    };
    let engine = InitEngine::new(PhaseTable::builtin(), revision).with_default_constraints(
        Constraints::new(settings.effective_max_files(), settings.effective_max_hours())?,
    );
    let mut sink = ConsoleSink::new(root);

    let report = match engine.init(root, &options, &mut sink) {
        Err(Error::DescriptorExists(existing)) => {
            eprintln!("Warning: workflow.json already exists at {}", existing.display());
            if !confirm("Overwrite? [y/N] ")? {
                println!("Cancelled. Use --force to overwrite without prompting.");
                return Ok(());
            }
            options.force = true;
            engine.init(root, &options, &mut sink)?
        }
        other => other?,
    };

    let config = &report.config;
    println!();
    println!("Initialization complete!");
    println!("  Type:        {}", config.primary_type);
    println!("  Prefix:      {}", config.task_prefix);
    println!(
        "  Constraints: ≤{} files/task, ≤{} hours/task",
        config.constraints.max_files_per_task, config.constraints.max_hours_per_task
    );
    println!("  Phases:      {}", config.phases.len());
    if !config.init_commit.is_empty() {
        let short: String = config.init_commit.chars().take(8).collect();
        println!("  initCommit:  {}", short);
    }
    if options.task_type.is_none() {
        println!();
        println!("Hint: no --type given; the orchestrator should triage the task type.");
    }
    Ok(())
}

/// Ask on stdin. A non-interactive stdin always answers no.
fn confirm(prompt: &str) -> Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }
    print!("{prompt}");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn warn_shadowed(shadowed: Option<&Path>) {
    if let Some(legacy) = shadowed {
        eprintln!(
            "Warning: a legacy descriptor also exists at {} and was left untouched.",
            legacy.display()
        );
    }
}

fn run_archive(root: &Path, label: Option<String>, settings: &Config) -> Result<()> {
    let mut sink = ConsoleSink::new(root);
    let report = archive_engine(settings).archive(root, label.as_deref(), &mut sink)?;

    println!();
    println!("Archive complete!");
    println!("  Directory: {}", sink.rel(&report.directory));
    println!("  Moved:     {}", report.moved_count());
    println!("  Skipped:   {}", report.skipped_count());
    println!("  workflow.json: archived and removed");
    warn_shadowed(report.shadowed_legacy.as_deref());
    println!();
    println!("The project is clean and ready for the next workflow.");
    Ok(())
}

fn run_abort(root: &Path, mode: AbortMode, label: Option<String>, settings: &Config) -> Result<()> {
    let mut sink = ConsoleSink::new(root);
    let engine = AbortEngine::new(archive_engine(settings));
    let report = engine.abort(root, mode, label.as_deref(), &mut sink)?;

    println!();
    match &report {
        TerminationReport::Archived(r) => {
            println!("Archive complete!");
            println!("  Directory: {}", sink.rel(&r.directory));
            println!("  Moved:     {}", r.moved_count());
            println!("  Skipped:   {}", r.skipped_count());
        }
        TerminationReport::Deleted(r) => {
            println!("Delete complete!");
            println!("  Deleted:   {}", r.deleted_count());
            println!("  Skipped:   {}", r.skipped_count());
        }
    }
    warn_shadowed(report.shadowed_legacy());
    println!();
    println!("The project is clean. Run init to start a new workflow.");
    Ok(())
}

fn run_status(root: &Path) -> Result<()> {
    let status = inspect(root)?;
    let sink = ConsoleSink::new(root);

    match &status.state {
        BundleState::Absent => println!("No active workflow (workflow.json not found)."),
        BundleState::Active(location) => println!(
            "Active workflow: {} ({} layout)",
            sink.rel(&location.path),
            location.layout
        ),
        BundleState::Inconsistent { current, legacy } => {
            println!("Active workflow: {} (current layout)", sink.rel(current));
            println!(
                "Warning: a legacy descriptor also exists at {}",
                sink.rel(legacy)
            );
        }
    }
    if let Some(config) = &status.config {
        println!("  Type:   {} (prefix {})", config.primary_type, config.task_prefix);
        if !config.task_name.is_empty() {
            println!("  Task:   {}", config.task_name);
        }
        println!("  Phases: {}", config.phases.len());
    }
    println!();
    for (key, path, exists) in &status.files {
        let mark = if *exists { "✓" } else { "-" };
        println!("  {} {:<14} {}", mark, key.as_str(), sink.rel(path));
    }
    if let Some(report) = &status.report_artifact {
        println!("  ✓ {:<14} {}", "report", sink.rel(report));
    }
    Ok(())
}
