//! `shop proc` command - Manufacturing process management

use chrono::{DateTime, Utc};
use clap::{Subcommand, ValueEnum};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{
    confirm, escape_csv, format_short_id, format_when, parse_date, parse_part_id,
    parse_project_id, parse_task_id, truncate_str, Session, ShopWorkshop,
};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::clock::Clock;
use crate::core::entity::Priority;
use crate::core::identity::EntityId;
use crate::core::workshop::WorkshopResult;
use crate::core::Config;
use crate::entities::process::{ManufacturingProcess, ProcessStatus, ProcessType, SkillLevel};

#[derive(Subcommand, Debug)]
pub enum ProcCommands {
    /// Plan a new manufacturing process
    New(NewArgs),

    /// List processes with filtering
    List(ListArgs),

    /// Show a process with its steps and checkpoints
    Show(IdArgs),

    /// Edit a process file in your editor
    Edit(IdArgs),

    /// Delete a process
    Delete(ConfirmArgs),

    /// Mark a planned or reworked process ready to start
    Ready(IdArgs),

    /// Start work on a process
    Start(StartArgs),

    /// Pause an in-progress process
    Pause(ReasonArgs),

    /// Resume a paused process
    Resume(IdArgs),

    /// Block a process (e.g. waiting on material)
    Block(BlockArgs),

    /// Clear a block
    Unblock(IdArgs),

    /// Put a process on hold
    Hold(ReasonArgs),

    /// Release a process from hold
    Release(IdArgs),

    /// Cancel a process
    Cancel(CancelArgs),

    /// Mark a process as failed
    Fail(ReasonArgs),

    /// Complete a process (refused while a checkpoint blocks it)
    Complete(CompleteArgs),

    /// Approve a process under review
    Approve(ApproveArgs),

    /// Reject a process under review and send it to rework
    Reject(RejectArgs),

    /// Record quality issues found on a process
    Issues(IssuesArgs),

    /// Mark recorded quality issues as resolved
    Resolve(ResolveArgs),

    /// Recompute progress from completed steps
    Progress(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct ReasonArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub id: String,

    /// Reason, appended to the process notes
    #[arg(long, short = 'r')]
    pub reason: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct BlockArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub id: String,

    /// What the process is waiting on
    #[arg(long, short = 'r')]
    pub reason: String,
}

#[derive(clap::Args, Debug)]
pub struct ConfirmArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub id: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct CancelArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub id: String,

    /// Reason, appended to the process notes
    #[arg(long, short = 'r')]
    pub reason: Option<String>,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct StartArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub id: String,

    /// Team member doing the work (default: configured author)
    #[arg(long, short = 'a')]
    pub assignee: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct CompleteArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub id: String,

    /// Completion notes
    #[arg(long, short = 'n')]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ApproveArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub id: String,

    /// Approver (default: configured author)
    #[arg(long)]
    pub by: Option<String>,

    /// Approval notes
    #[arg(long, short = 'n')]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RejectArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub id: String,

    /// Reviewer rejecting the work (default: configured author)
    #[arg(long)]
    pub by: Option<String>,

    /// What needs to be reworked
    #[arg(long, short = 'r')]
    pub reason: String,
}

#[derive(clap::Args, Debug)]
pub struct IssuesArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub id: String,

    /// Description of the issues found
    pub issues: String,

    /// Corrective actions to take
    #[arg(long)]
    pub actions: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// Process ID, partial ID, or short ID (@N)
    pub id: String,

    /// How the issues were resolved
    #[arg(long, short = 'n')]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Process name (prompted for when omitted in a terminal)
    pub name: Option<String>,

    /// Process type (machining, cutting, drilling, welding, assembly, wiring, ...)
    #[arg(long, short = 'T', default_value = "machining")]
    pub r#type: ProcessType,

    /// Priority (critical, high, medium, low)
    #[arg(long, short = 'p', default_value = "medium")]
    pub priority: Priority,

    /// Longer description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Estimated hours
    #[arg(long)]
    pub estimate: Option<f64>,

    /// Planned start (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub start: Option<DateTime<Utc>>,

    /// Planned end (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub end: Option<DateTime<Utc>>,

    /// Target completion date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub target: Option<DateTime<Utc>>,

    /// Required skill level (beginner, intermediate, advanced, expert)
    #[arg(long, default_value = "intermediate")]
    pub skill: SkillLevel,

    /// Supervising mentor or lead
    #[arg(long)]
    pub supervisor: Option<String>,

    /// Owning task (TASK-...)
    #[arg(long, value_parser = parse_task_id)]
    pub task: Option<EntityId>,

    /// Owning project (PRJ-...)
    #[arg(long, value_parser = parse_project_id)]
    pub prj: Option<EntityId>,

    /// Part consumed by the process (PART-..., repeatable)
    #[arg(long = "part", value_parser = parse_part_id)]
    pub parts: Vec<EntityId>,

    /// Tools required
    #[arg(long)]
    pub tools: Option<String>,

    /// Materials required
    #[arg(long)]
    pub materials: Option<String>,

    /// Safety notes (PPE, guards, ...)
    #[arg(long)]
    pub safety: Option<String>,

    /// Require sign-off before completion
    #[arg(long)]
    pub requires_approval: bool,

    /// Require a quality inspection
    #[arg(long)]
    pub requires_inspection: bool,

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Open in editor after creation
    #[arg(long, short = 'e')]
    pub edit: bool,
}

/// Predefined process views
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum View {
    All,
    /// Planned or ready
    Ready,
    /// In progress
    Active,
    Blocked,
    /// Failed, on hold, or blocked
    Attention,
    Overdue,
    /// Deadline within the configured warning window
    Approaching,
    /// Open quality issues
    Quality,
    /// Requires approval, not yet approved
    Approval,
    Completed,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Predefined view
    #[arg(long, default_value = "all")]
    pub view: View,

    /// Filter by status
    #[arg(long, short = 's')]
    pub status: Option<ProcessStatus>,

    /// Filter by process type
    #[arg(long, short = 'T')]
    pub r#type: Option<ProcessType>,

    /// Filter by priority
    #[arg(long, short = 'p')]
    pub priority: Option<Priority>,

    /// Filter by assignee
    #[arg(long, short = 'a')]
    pub assignee: Option<String>,

    /// Filter by task (TASK-...)
    #[arg(long, value_parser = parse_task_id)]
    pub task: Option<EntityId>,

    /// Filter by project (PRJ-...)
    #[arg(long, value_parser = parse_project_id)]
    pub prj: Option<EntityId>,

    /// Search in name
    #[arg(long)]
    pub search: Option<String>,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

/// Run a process subcommand
pub fn run(cmd: ProcCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProcCommands::New(args) => run_new(args, global),
        ProcCommands::List(args) => run_list(args, global),
        ProcCommands::Show(args) => run_show(args, global),
        ProcCommands::Edit(args) => run_edit(args, global),
        ProcCommands::Delete(args) => run_delete(args, global),
        ProcCommands::Ready(args) => apply(global, &args.id, "Ready", |ws, id, _| ws.mark_ready(id)),
        ProcCommands::Start(args) => apply(global, &args.id, "Started", |ws, id, config| {
            let assignee = args.assignee.clone().unwrap_or_else(|| config.author());
            ws.start(id, &assignee)
        }),
        ProcCommands::Pause(args) => apply(global, &args.id, "Paused", |ws, id, _| {
            ws.pause(id, args.reason.as_deref())
        }),
        ProcCommands::Resume(args) => apply(global, &args.id, "Resumed", |ws, id, _| ws.resume(id)),
        ProcCommands::Block(args) => apply(global, &args.id, "Blocked", |ws, id, _| {
            ws.block(id, &args.reason)
        }),
        ProcCommands::Unblock(args) => {
            apply(global, &args.id, "Unblocked", |ws, id, _| ws.unblock(id))
        }
        ProcCommands::Hold(args) => apply(global, &args.id, "Held", |ws, id, _| {
            ws.hold(id, args.reason.as_deref())
        }),
        ProcCommands::Release(args) => {
            apply(global, &args.id, "Released", |ws, id, _| ws.release(id))
        }
        ProcCommands::Cancel(args) => run_cancel(args, global),
        ProcCommands::Fail(args) => apply(global, &args.id, "Failed", |ws, id, _| {
            ws.fail(id, args.reason.as_deref())
        }),
        ProcCommands::Complete(args) => apply(global, &args.id, "Completed", |ws, id, _| {
            ws.complete(id, args.notes.as_deref())
        }),
        ProcCommands::Approve(args) => apply(global, &args.id, "Approved", |ws, id, config| {
            let approver = args.by.clone().unwrap_or_else(|| config.author());
            ws.approve(id, &approver, args.notes.as_deref())
        }),
        ProcCommands::Reject(args) => apply(global, &args.id, "Rejected", |ws, id, config| {
            let rejecter = args.by.clone().unwrap_or_else(|| config.author());
            ws.reject(id, &rejecter, &args.reason)
        }),
        ProcCommands::Issues(args) => apply(global, &args.id, "Recorded issues on", |ws, id, _| {
            ws.record_quality_issues(id, &args.issues, args.actions.as_deref())
        }),
        ProcCommands::Resolve(args) => apply(global, &args.id, "Resolved issues on", |ws, id, _| {
            ws.resolve_quality_issues(id, args.notes.as_deref())
        }),
        ProcCommands::Progress(args) => {
            apply(global, &args.id, "Refreshed", |ws, id, _| ws.refresh_progress(id))
        }
    }
}

/// Resolve the reference, run one workshop operation, and report the result
pub(crate) fn apply<F>(global: &GlobalOpts, reference: &str, verb: &str, op: F) -> Result<()>
where
    F: FnOnce(&mut ShopWorkshop, &str, &Config) -> WorkshopResult<ManufacturingProcess>,
{
    let mut session = Session::open(global)?;
    let id = session.resolve(reference)?;
    let process = op(&mut session.workshop, &id, &session.config).into_diagnostic()?;
    session.report(global, &process, verb)
}

fn prompt_name_and_type(args: &NewArgs) -> Result<(String, ProcessType)> {
    let theme = ColorfulTheme::default();
    let name: String = Input::with_theme(&theme)
        .with_prompt("Process name")
        .with_initial_text(args.name.clone().unwrap_or_default())
        .interact_text()
        .into_diagnostic()?;

    let types = ProcessType::all();
    let labels: Vec<String> = types
        .iter()
        .map(|t| format!("{:<14} {}", t.as_str(), t.description()))
        .collect();
    let default = types.iter().position(|t| *t == args.r#type).unwrap_or(0);
    let choice = Select::with_theme(&theme)
        .with_prompt("Process type")
        .items(&labels)
        .default(default)
        .interact()
        .into_diagnostic()?;

    Ok((name, types[choice]))
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let (name, process_type) = match (&args.name, args.interactive) {
        (Some(name), false) => (name.clone(), args.r#type),
        _ if console::user_attended() => prompt_name_and_type(&args)?,
        _ => return Err(miette::miette!("A process name is required")),
    };
    if name.trim().is_empty() {
        return Err(miette::miette!("A process name is required"));
    }

    let author = session.config.author();
    let mut process = session.workshop.draft(name.trim(), process_type, &author);
    process.priority = args.priority;
    process.description = args.description;
    process.estimated_hours = args.estimate;
    process.planned_start = args.start;
    process.planned_end = args.end;
    process.target_completion = args.target;
    process.required_skill = args.skill;
    process.supervisor = args.supervisor;
    process.required_tools = args.tools;
    process.materials = args.materials;
    process.safety_notes = args.safety;
    process.requires_approval = args.requires_approval;
    process.requires_quality_inspection = args.requires_inspection;
    process.links.task = args.task;
    process.links.project = args.prj;
    process.links.parts = args.parts;

    let process = session.workshop.create(process).into_diagnostic()?;
    let path = session.workshop.store().path_for(&process.id);

    let short_id = session.short_ids.add(process.id.to_string());
    if let Err(e) = session.short_ids.save(&session.project) {
        tracing::warn!(error = %e, "could not save short ID index");
    }

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&process).into_diagnostic()?);
        }
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&process).into_diagnostic()?),
        OutputFormat::Id => println!("{}", process.id),
        _ if global.quiet => {}
        _ => {
            println!(
                "{} Created process {} {}",
                style("✓").green(),
                style(format!("@{}", short_id)).cyan(),
                style(&process.id).dim()
            );
            println!("   {}", style(path.display()).dim());
            println!(
                "   Type: {} | Priority: {} | {}",
                style(process.process_type).yellow(),
                process.priority,
                style(&process.name).white()
            );
        }
    }

    if args.edit {
        session.config.run_editor(&path).into_diagnostic()?;
    }

    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let ws = &session.workshop;

    let mut processes = match args.view {
        View::All => ws.all(),
        View::Ready => ws.find_ready(),
        View::Active => ws.find_active(),
        View::Blocked => ws.find_blocked(),
        View::Attention => ws.find_needing_attention(),
        View::Overdue => ws.find_overdue(),
        View::Approaching => ws.find_approaching_deadline(session.config.deadline_warning_days()),
        View::Quality => ws.find_with_quality_issues(),
        View::Approval => ws.find_awaiting_approval(),
        View::Completed => ws.find_completed(),
    }
    .into_diagnostic()?;

    if let Some(status) = args.status {
        processes.retain(|p| p.status == status);
    }
    if let Some(process_type) = args.r#type {
        processes.retain(|p| p.process_type == process_type);
    }
    if let Some(priority) = args.priority {
        processes.retain(|p| p.priority == priority);
    }
    if let Some(ref member) = args.assignee {
        processes.retain(|p| {
            p.assigned_to
                .as_deref()
                .is_some_and(|a| a.eq_ignore_ascii_case(member))
        });
    }
    if let Some(ref task) = args.task {
        processes.retain(|p| p.links.task.as_ref() == Some(task));
    }
    if let Some(ref prj) = args.prj {
        processes.retain(|p| p.links.project.as_ref() == Some(prj));
    }
    if let Some(ref search) = args.search {
        let needle = search.to_lowercase();
        processes.retain(|p| p.name.to_lowercase().contains(&needle));
    }
    if let Some(limit) = args.limit {
        processes.truncate(limit);
    }

    if args.count {
        println!("{}", processes.len());
        return Ok(());
    }

    if processes.is_empty() {
        if !global.quiet {
            println!("No processes found.");
        }
        return Ok(());
    }

    session
        .short_ids
        .rebuild(processes.iter().map(|p| p.id.to_string()));
    if let Err(e) = session.short_ids.save(&session.project) {
        tracing::warn!(error = %e, "could not save short ID index");
    }
    let short_ids = &session.short_ids;
    let short = |p: &ManufacturingProcess| {
        short_ids
            .get_short_id(&p.id.to_string())
            .map(|n| format!("@{}", n))
            .unwrap_or_default()
    };

    let format = match global.format {
        OutputFormat::Auto => OutputFormat::Tsv,
        f => f,
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&processes).into_diagnostic()?);
        }
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&processes).into_diagnostic()?),
        OutputFormat::Id => {
            for p in &processes {
                println!("{}", p.id);
            }
        }
        OutputFormat::Csv => {
            println!("short_id,id,name,type,priority,status,progress,assigned_to,target");
            for p in &processes {
                println!(
                    "{},{},{},{},{},{},{},{},{}",
                    short(p),
                    p.id,
                    escape_csv(&p.name),
                    p.process_type,
                    p.priority,
                    p.status,
                    p.progress,
                    escape_csv(p.assigned_to.as_deref().unwrap_or("")),
                    p.deadline().map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
                );
            }
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["Short", "ID", "Name", "Type", "Priority", "Status", "Progress"]);
            for p in &processes {
                builder.push_record([
                    short(p),
                    format_short_id(&p.id),
                    p.name.clone(),
                    p.process_type.to_string(),
                    p.priority.to_string(),
                    p.status.to_string(),
                    format!("{}%", p.progress),
                ]);
            }
            println!("{}", builder.build().with(Style::markdown()));
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!(
                "{:<6} {:<17} {:<30} {:<13} {:<9} {:<12} {:>4} {:<14} {}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("NAME").bold(),
                style("TYPE").bold(),
                style("PRIORITY").bold(),
                style("STATUS").bold(),
                style("PROG").bold(),
                style("ASSIGNEE").bold(),
                style("DUE").bold()
            );
            println!("{}", "-".repeat(118));

            let now = session.workshop.clock().now();
            for p in &processes {
                let due = p
                    .deadline()
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string());
                let due = if p.is_overdue(now) {
                    style(due).red().to_string()
                } else {
                    due
                };
                println!(
                    "{:<6} {:<17} {:<30} {:<13} {:<9} {:<12} {:>3}% {:<14} {}",
                    style(short(p)).cyan(),
                    format_short_id(&p.id),
                    truncate_str(&p.name, 28),
                    p.process_type,
                    p.priority,
                    p.status,
                    p.progress,
                    truncate_str(p.assigned_to.as_deref().unwrap_or("-"), 14),
                    due
                );
            }

            if !global.quiet {
                println!();
                println!(
                    "{} process(es) found. Use {} to reference by short ID.",
                    style(processes.len()).cyan(),
                    style("@N").cyan()
                );
            }
        }
    }

    Ok(())
}

fn run_show(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let id = session.resolve(&args.id)?;
    let p = session.workshop.get(&id).into_diagnostic()?;

    match global.format {
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&p).into_diagnostic()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&p).into_diagnostic()?),
        OutputFormat::Id => println!("{}", p.id),
        _ => print_process(&session, &p),
    }

    Ok(())
}

fn print_process(session: &Session, p: &ManufacturingProcess) {
    let rule = style("─".repeat(60)).dim();
    println!("{}", rule);
    println!("{}: {} ({})", style("ID").bold(), style(&p.id).cyan(), session.label(&p.id));
    println!("{}: {}", style("Name").bold(), style(&p.name).yellow());
    println!(
        "{}: {} {}",
        style("Status").bold(),
        p.status.icon(),
        p.status.display_name()
    );
    println!(
        "{}: {} {}",
        style("Priority").bold(),
        p.priority.icon(),
        p.priority.display_name()
    );
    println!(
        "{}: {} ({})",
        style("Type").bold(),
        p.process_type,
        p.process_type.description()
    );
    println!("{}: {}", style("Skill").bold(), p.required_skill);
    if let Some(ref member) = p.assigned_to {
        println!("{}: {}", style("Assigned To").bold(), member);
    }
    if let Some(ref supervisor) = p.supervisor {
        println!("{}: {}", style("Supervisor").bold(), supervisor);
    }
    println!("{}", rule);

    println!();
    println!("{}", style("Schedule:").bold());
    println!("  Planned: {} → {}", format_when(p.planned_start), format_when(p.planned_end));
    println!("  Target:  {}", format_when(p.target_completion));
    println!("  Actual:  {} → {}", format_when(p.actual_start), format_when(p.actual_end));
    if let Some(est) = p.estimated_hours {
        println!("  Estimated: {:.1} h", est);
    }
    if let Some(worked) = p.worked_hours() {
        println!("  Worked:    {:.1} h", worked);
    }
    if p.is_overdue(session.workshop.clock().now()) {
        println!("  {}", style("OVERDUE").red().bold());
    }

    println!();
    println!(
        "{}: {}% ({}/{} steps)",
        style("Progress").bold(),
        p.progress,
        p.completed_steps_count(),
        p.steps.len()
    );

    if p.blocked {
        println!(
            "{}: {}",
            style("Blocked").red().bold(),
            p.blocked_reason.as_deref().unwrap_or("-")
        );
    }
    if p.has_quality_issues {
        println!(
            "{}: {}",
            style("Quality Issues").red().bold(),
            p.quality_issues.as_deref().unwrap_or("-")
        );
    }
    if p.requires_approval || p.approved_by.is_some() || p.rejected_by.is_some() {
        let state = if p.approved {
            format!("approved by {}", p.approved_by.as_deref().unwrap_or("?"))
        } else if let Some(ref rejecter) = p.rejected_by {
            format!("rejected by {}", rejecter)
        } else {
            "pending".to_string()
        };
        println!("{}: {}", style("Approval").bold(), state);
        if let Some(ref notes) = p.approval_notes {
            println!("  {}", notes);
        }
    }

    if !p.steps.is_empty() {
        println!();
        println!("{} ({}):", style("Steps").bold(), p.steps.len());
        for step in &p.steps {
            let verified = if step.verified { " ✔ verified" } else { "" };
            println!(
                "  {:>2}. {} {} [{}]{}",
                step.sequence,
                step.status.icon(),
                step.name,
                step.status.display_name(),
                verified
            );
        }
    }

    if !p.checkpoints.is_empty() {
        println!();
        println!("{} ({}):", style("Checkpoints").bold(), p.checkpoints.len());
        for (i, qc) in p.checkpoints.iter().enumerate() {
            let result = qc
                .result
                .map(|r| format!(" → {} {}", r.icon(), r.display_name()))
                .unwrap_or_default();
            let gate = if qc.blocks_completion() {
                style(" (blocking)").red().to_string()
            } else {
                String::new()
            };
            println!(
                "  {:>2}. {} {} [{}]{}{}",
                i + 1,
                qc.status.icon(),
                qc.name,
                qc.checkpoint_type,
                result,
                gate
            );
        }
    }

    for (label, text) in [
        ("Description", &p.description),
        ("Tools", &p.required_tools),
        ("Materials", &p.materials),
        ("Safety", &p.safety_notes),
        ("Notes", &p.notes),
        ("Completion Notes", &p.completion_notes),
    ] {
        if let Some(text) = text {
            println!();
            println!("{}", style(format!("{}:", label)).bold());
            println!("{}", text);
        }
    }

    if p.links.task.is_some() || p.links.project.is_some() || !p.links.parts.is_empty() {
        println!();
        println!("{}", style("Links:").bold());
        if let Some(ref task) = p.links.task {
            println!("  Task: {}", task);
        }
        if let Some(ref prj) = p.links.project {
            println!("  Project: {}", prj);
        }
        for part in &p.links.parts {
            println!("  Part: {}", part);
        }
    }

    println!("{}", rule);
    println!(
        "{}: {} | {}: {} | {}: {}",
        style("Author").dim(),
        p.author,
        style("Created").dim(),
        p.created.format("%Y-%m-%d %H:%M"),
        style("Revision").dim(),
        p.entity_revision
    );
}

fn run_edit(args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let id = session.resolve(&args.id)?;
    let process = session.workshop.get(&id).into_diagnostic()?;
    let path = session.workshop.store().path_for(&process.id);

    println!(
        "Opening {} in {}...",
        style(path.display()).cyan(),
        style(session.config.editor()).yellow()
    );
    session.config.run_editor(&path).into_diagnostic()?;

    if let Err(e) = session.workshop.get(&process.id.to_string()) {
        println!("{} {}", style("!").yellow(), e);
    }
    Ok(())
}

fn run_delete(args: ConfirmArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = session.resolve(&args.id)?;
    let process = session.workshop.get(&id).into_diagnostic()?;

    let prompt = format!("Delete {} '{}'?", session.label(&process.id), process.name);
    if !confirm(&prompt, args.yes)? {
        println!("Cancelled.");
        return Ok(());
    }

    let process = session
        .workshop
        .delete(&process.id.to_string())
        .into_diagnostic()?;
    if !global.quiet {
        println!(
            "{} Deleted {} {}",
            style("✓").green(),
            style(&process.id).cyan(),
            process.name
        );
    }
    Ok(())
}

fn run_cancel(args: CancelArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = session.resolve(&args.id)?;
    let process = session.workshop.get(&id).into_diagnostic()?;

    let prompt = format!("Cancel {} '{}'?", session.label(&process.id), process.name);
    if !confirm(&prompt, args.yes)? {
        println!("Not cancelled.");
        return Ok(());
    }

    let process = session
        .workshop
        .cancel(&process.id.to_string(), args.reason.as_deref())
        .into_diagnostic()?;
    session.report(global, &process, "Cancelled")
}
