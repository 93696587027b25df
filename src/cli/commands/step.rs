//! `shop step` command - Work through the ordered steps of a process

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::proc::apply;
use crate::cli::GlobalOpts;

#[derive(Subcommand, Debug)]
pub enum StepCommands {
    /// Append a step to a process
    Add(AddArgs),

    /// Start a pending step
    Start(ActorArgs),

    /// Complete an in-progress step (updates process progress)
    Complete(StepArgs),

    /// Verify a completed step
    Verify(ActorArgs),

    /// Skip a step
    Skip(ReasonArgs),

    /// Mark a step as failed
    Fail(ReasonArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub process: String,

    /// Step name
    pub name: String,

    /// Operator instructions
    #[arg(long)]
    pub instructions: Option<String>,

    /// Estimated minutes
    #[arg(long)]
    pub minutes: Option<u32>,

    /// Require a second person to verify the step
    #[arg(long)]
    pub verify: bool,
}

#[derive(clap::Args, Debug)]
pub struct StepArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub process: String,

    /// Step sequence number or step ID
    pub step: String,
}

#[derive(clap::Args, Debug)]
pub struct ActorArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub process: String,

    /// Step sequence number or step ID
    pub step: String,

    /// Team member (default: configured author)
    #[arg(long)]
    pub by: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ReasonArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub process: String,

    /// Step sequence number or step ID
    pub step: String,

    /// Reason, appended to the step notes
    #[arg(long, short = 'r')]
    pub reason: Option<String>,
}

pub fn run(cmd: StepCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        StepCommands::Add(args) => apply(global, &args.process, "Added step to", |ws, id, _| {
            ws.add_step(
                id,
                &args.name,
                args.instructions.as_deref(),
                args.minutes,
                args.verify,
            )
        }),
        StepCommands::Start(args) => {
            apply(global, &args.process, "Started step on", |ws, id, config| {
                let performer = args.by.clone().unwrap_or_else(|| config.author());
                ws.start_step(id, &args.step, &performer)
            })
        }
        StepCommands::Complete(args) => {
            apply(global, &args.process, "Completed step on", |ws, id, _| {
                ws.complete_step(id, &args.step)
            })
        }
        StepCommands::Verify(args) => {
            apply(global, &args.process, "Verified step on", |ws, id, config| {
                let verifier = args.by.clone().unwrap_or_else(|| config.author());
                ws.verify_step(id, &args.step, &verifier)
            })
        }
        StepCommands::Skip(args) => apply(global, &args.process, "Skipped step on", |ws, id, _| {
            ws.skip_step(id, &args.step, args.reason.as_deref())
        }),
        StepCommands::Fail(args) => apply(global, &args.process, "Failed step on", |ws, id, _| {
            ws.fail_step(id, &args.step, args.reason.as_deref())
        }),
    }
}
