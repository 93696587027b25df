//! `shop status` command - Shop floor dashboard

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{truncate_str, Session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::workshop::ProcessMetrics;
use crate::entities::process::ManufacturingProcess;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Deadline look-ahead in days (default: deadline_warning_days from config)
    #[arg(long)]
    pub days: Option<i64>,

    /// List every process in each section instead of the first five
    #[arg(long)]
    pub detailed: bool,
}

struct Section {
    title: &'static str,
    processes: Vec<ManufacturingProcess>,
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let ws = &session.workshop;
    let days = args
        .days
        .unwrap_or_else(|| session.config.deadline_warning_days());

    let metrics = ws.metrics().into_diagnostic()?;
    let sections = [
        Section {
            title: "NEEDS ATTENTION",
            processes: ws.find_needing_attention().into_diagnostic()?,
        },
        Section {
            title: "OVERDUE",
            processes: ws.find_overdue().into_diagnostic()?,
        },
        Section {
            title: "DUE SOON",
            processes: ws.find_approaching_deadline(days).into_diagnostic()?,
        },
        Section {
            title: "QUALITY ISSUES",
            processes: ws.find_with_quality_issues().into_diagnostic()?,
        },
        Section {
            title: "AWAITING APPROVAL",
            processes: ws.find_awaiting_approval().into_diagnostic()?,
        },
        Section {
            title: "IN PROGRESS",
            processes: ws.find_active().into_diagnostic()?,
        },
    ];

    tracing::debug!(total = metrics.total, days, "computed shop status");

    match global.format {
        OutputFormat::Json | OutputFormat::Yaml => {
            let mut status = serde_json::json!({ "metrics": metrics });
            for section in &sections {
                let key = section.title.to_lowercase().replace(' ', "_");
                let ids: Vec<String> = section.processes.iter().map(|p| p.id.to_string()).collect();
                status[key] = serde_json::json!(ids);
            }
            if global.format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&status).into_diagnostic()?);
            } else {
                print!("{}", serde_yml::to_string(&status).into_diagnostic()?);
            }
        }
        _ => print_dashboard(&metrics, &sections, args.detailed, global),
    }

    Ok(())
}

fn print_dashboard(metrics: &ProcessMetrics, sections: &[Section], detailed: bool, global: &GlobalOpts) {
    let width = 68;
    println!("{}", style("Shop Floor Status").bold().underlined());
    println!("{}", "═".repeat(width));

    if metrics.total == 0 {
        println!("No processes yet. Create one with {}.", style("shop proc new").yellow());
        return;
    }

    println!(
        "Processes: {} | Completed: {} ({:.0}%) | With issues: {}",
        style(metrics.total).cyan(),
        style(metrics.completed).green(),
        metrics.completion_rate(),
        style(metrics.with_quality_issues).red()
    );
    let hours = |h: Option<f64>| h.map(|h| format!("{:.1} h", h)).unwrap_or_else(|| "-".to_string());
    println!(
        "Avg estimate: {} | Avg actual (completed): {}",
        hours(metrics.average_estimated_hours),
        hours(metrics.average_actual_hours)
    );
    println!();

    let mut builder = Builder::default();
    builder.push_record(["Status", "Count"]);
    for (status, count) in &metrics.by_status {
        builder.push_record([
            format!("{} {}", status.icon(), status.display_name()),
            count.to_string(),
        ]);
    }
    let mut table = builder.build();
    if global.format == OutputFormat::Md {
        table.with(Style::markdown());
    } else {
        table.with(Style::rounded());
    }
    println!("{}", table);

    if !metrics.by_type.is_empty() {
        let types: Vec<String> = metrics
            .by_type
            .iter()
            .map(|(t, n)| format!("{} {}", t, n))
            .collect();
        println!("By type: {}", types.join(", "));
    }

    for section in sections {
        if section.processes.is_empty() {
            continue;
        }
        println!();
        println!(
            "{} ({})",
            style(section.title).bold(),
            section.processes.len()
        );
        let shown = if detailed { section.processes.len() } else { 5 };
        for p in section.processes.iter().take(shown) {
            let who = p.assigned_to.as_deref().unwrap_or("unassigned");
            let due = p
                .deadline()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
            println!(
                "  {} {:<32} {:<14} {:>3}% {}",
                p.status.icon(),
                truncate_str(&p.name, 30),
                truncate_str(who, 14),
                p.progress,
                style(due).dim()
            );
        }
        if section.processes.len() > shown {
            println!(
                "  {} more; see {}",
                section.processes.len() - shown,
                style("shop proc list --view ...").yellow()
            );
        }
    }

    println!("{}", "═".repeat(width));
}
