use clap::{Args, Parser, Subcommand};

use crate::model::checklist::ChecklistKind;

#[derive(Parser)]
#[command(name = "mu", about = concat!("muster v", env!("CARGO_PKG_VERSION"), " - department checklists, kept in sync"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run as if started in this directory
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,

    /// Checklist kind: onboarding or clearance (default from muster.toml)
    #[arg(short = 'k', long, global = true)]
    pub kind: Option<ChecklistKind>,

    /// Record to open first, by name or department
    #[arg(short = 't', long, global = true)]
    pub target: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List checklist records
    List,
    /// Show one record with its tasks
    Show(ShowArgs),
    /// List position and department options
    Options,
    /// Find records whose label contains the query as a subsequence
    Find(FindArgs),
    /// Edit the tasks of the selected record and save
    Task(TaskCmd),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ShowArgs {
    /// Record number (from `mu list`), name, or department
    pub record: Option<String>,
}

#[derive(Args)]
pub struct FindArgs {
    /// Search query
    pub query: String,
}

// ---------------------------------------------------------------------------
// Task command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TaskCmd {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Append a task
    Add(TaskAddArgs),
    /// Mark a task done
    Done(TaskIdArgs),
    /// Mark a task pending
    Pending(TaskIdArgs),
    /// Replace a task's text
    Edit(TaskEditArgs),
    /// Remove a task
    Rm(TaskIdArgs),
}

#[derive(Args)]
pub struct TaskAddArgs {
    /// Task text
    pub text: String,
    /// Add it already done
    #[arg(long)]
    pub done: bool,
}

#[derive(Args)]
pub struct TaskIdArgs {
    /// Task id
    pub id: String,
}

#[derive(Args)]
pub struct TaskEditArgs {
    /// Task id
    pub id: String,
    /// New text (may be empty)
    pub text: String,
}
