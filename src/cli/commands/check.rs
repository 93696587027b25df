//! `shop check` command - Quality checkpoint inspections

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::proc::apply;
use crate::cli::GlobalOpts;
use crate::core::entity::Priority;
use crate::entities::checkpoint::{CheckpointResult, CheckpointType, QualityCheckpoint};

#[derive(Subcommand, Debug)]
pub enum CheckCommands {
    /// Add a quality checkpoint to a process
    Add(AddArgs),

    /// Begin an inspection
    Start(StartArgs),

    /// Record the inspection result
    Complete(CompleteArgs),

    /// Record issues found at a checkpoint
    Issues(IssuesArgs),

    /// Skip a checkpoint
    Skip(ReasonArgs),

    /// Defer a checkpoint to later
    Defer(ReasonArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub process: String,

    /// Checkpoint name
    pub name: String,

    /// Checkpoint type (dimensional, visual, functional, material, assembly, safety, ...)
    #[arg(long, short = 'T', default_value = "visual")]
    pub r#type: CheckpointType,

    /// What is being checked
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Acceptance criteria
    #[arg(long)]
    pub criteria: Option<String>,

    /// Priority (critical, high, medium, low)
    #[arg(long, short = 'p', default_value = "medium")]
    pub priority: Priority,

    /// Tools needed for the inspection
    #[arg(long)]
    pub tools: Option<String>,

    /// Tolerance specifications
    #[arg(long)]
    pub tolerance: Option<String>,

    /// Not required for completion
    #[arg(long)]
    pub optional: bool,

    /// Never gate process completion
    #[arg(long)]
    pub non_blocking: bool,
}

#[derive(clap::Args, Debug)]
pub struct StartArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub process: String,

    /// Checkpoint number, name, or ID
    pub checkpoint: String,

    /// Inspector (default: configured author)
    #[arg(long)]
    pub inspector: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct CompleteArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub process: String,

    /// Checkpoint number, name, or ID
    pub checkpoint: String,

    /// Result (pass, fail, conditional_pass, needs_rework, inconclusive)
    #[arg(long, short = 'r')]
    pub result: CheckpointResult,

    /// Inspection notes
    #[arg(long, short = 'n')]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct IssuesArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub process: String,

    /// Checkpoint number, name, or ID
    pub checkpoint: String,

    /// Issues found
    pub issues: String,

    /// Corrective actions to take
    #[arg(long)]
    pub actions: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ReasonArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub process: String,

    /// Checkpoint number, name, or ID
    pub checkpoint: String,

    /// Reason, appended to the inspection notes
    #[arg(long, short = 'r')]
    pub reason: Option<String>,
}

pub fn run(cmd: CheckCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CheckCommands::Add(args) => {
            let mut checkpoint = QualityCheckpoint::new(args.name, args.r#type);
            checkpoint.description = args.description;
            checkpoint.acceptance_criteria = args.criteria;
            checkpoint.priority = args.priority;
            checkpoint.required_tools = args.tools;
            checkpoint.tolerance_specs = args.tolerance;
            checkpoint.mandatory = !args.optional;
            checkpoint.blocking = !args.non_blocking;

            apply(global, &args.process, "Added checkpoint to", |ws, id, _| {
                ws.add_checkpoint(id, checkpoint)
            })
        }
        CheckCommands::Start(args) => {
            apply(global, &args.process, "Inspecting", |ws, id, config| {
                let inspector = args.inspector.clone().unwrap_or_else(|| config.author());
                ws.start_inspection(id, &args.checkpoint, &inspector)
            })
        }
        CheckCommands::Complete(args) => {
            let verb = format!("Inspected ({})", args.result.display_name());
            apply(global, &args.process, &verb, |ws, id, _| {
                ws.complete_inspection(id, &args.checkpoint, args.result, args.notes.as_deref())
            })
        }
        CheckCommands::Issues(args) => {
            apply(global, &args.process, "Recorded checkpoint issues on", |ws, id, _| {
                ws.record_checkpoint_issues(
                    id,
                    &args.checkpoint,
                    &args.issues,
                    args.actions.as_deref(),
                )
            })
        }
        CheckCommands::Skip(args) => {
            apply(global, &args.process, "Skipped checkpoint on", |ws, id, _| {
                ws.skip_checkpoint(id, &args.checkpoint, args.reason.as_deref())
            })
        }
        CheckCommands::Defer(args) => {
            apply(global, &args.process, "Deferred checkpoint on", |ws, id, _| {
                ws.defer_checkpoint(id, &args.checkpoint, args.reason.as_deref())
            })
        }
    }
}
