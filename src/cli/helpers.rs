//! Shared helper functions for CLI commands

use chrono::{DateTime, NaiveDate, Utc};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::clock::SystemClock;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::project::Project;
use crate::core::shortid::ShortIdIndex;
use crate::core::store::YamlStore;
use crate::core::workshop::Workshop;
use crate::core::Config;
use crate::entities::process::ManufacturingProcess;

pub type ShopWorkshop = Workshop<YamlStore, SystemClock>;

/// Everything a command needs to act on the current project
pub struct Session {
    pub project: Project,
    pub config: Config,
    pub short_ids: ShortIdIndex,
    pub workshop: ShopWorkshop,
}

impl Session {
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = discover_project(global)?;
        let config = match &global.config {
            Some(config) => config.clone(),
            None => Config::load_for(Some(&project)),
        };
        let short_ids = ShortIdIndex::load(&project);
        let workshop = Workshop::new(YamlStore::new(project.clone()), SystemClock);
        Ok(Self {
            project,
            config,
            short_ids,
            workshop,
        })
    }

    /// Turn `@N` into a full ID; other references pass through for partial matching
    pub fn resolve(&self, reference: &str) -> Result<String> {
        self.short_ids.resolve(reference).ok_or_else(|| {
            miette::miette!(
                "Unknown short ID '{}'. Run 'shop proc list' to refresh short IDs.",
                reference
            )
        })
    }

    /// `@N` when the process has a short ID, otherwise a truncated full ID
    pub fn label(&self, id: &EntityId) -> String {
        self.short_ids
            .get_short_id(&id.to_string())
            .map(|n| format!("@{}", n))
            .unwrap_or_else(|| format_short_id(id))
    }

    /// Print the outcome of a lifecycle command in the requested format
    pub fn report(&self, global: &GlobalOpts, process: &ManufacturingProcess, verb: &str) -> Result<()> {
        let summary = serde_json::json!({
            "id": process.id.to_string(),
            "short_id": self.short_ids.get_short_id(&process.id.to_string()),
            "name": process.name,
            "status": process.status.as_str(),
            "progress": process.progress,
        });

        match global.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&summary).into_diagnostic()?);
            }
            OutputFormat::Yaml => {
                print!("{}", serde_yml::to_string(&summary).into_diagnostic()?);
            }
            OutputFormat::Id => println!("{}", process.id),
            _ if global.quiet => {}
            _ => {
                println!(
                    "{} {} {} {} [{} {}]",
                    style("✓").green(),
                    verb,
                    style(self.label(&process.id)).cyan(),
                    style(&process.name).yellow(),
                    process.status.icon(),
                    process.status.display_name()
                );
                if !process.steps.is_empty() {
                    println!(
                        "   Progress: {}% ({}/{} steps)",
                        process.progress,
                        process.completed_steps_count(),
                        process.steps.len()
                    );
                }
            }
        }
        Ok(())
    }
}

pub fn discover_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    project.map_err(|e| miette::miette!("{}", e))
}

/// Ask before a destructive change; `--yes` skips the prompt
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !console::user_attended() {
        return Err(miette::miette!(
            "{} Re-run with --yes to confirm non-interactively.",
            prompt
        ));
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

/// Format an EntityId for display, truncating if too long
pub fn format_short_id(id: &EntityId) -> String {
    truncate_str(&id.to_string(), 16)
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Escape a string for CSV output (RFC 4180)
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Accept RFC 3339 timestamps or plain `YYYY-MM-DD` dates (end of that day, UTC)
pub fn parse_date(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date '{}': use YYYY-MM-DD or RFC 3339", s))
}

pub fn parse_task_id(s: &str) -> std::result::Result<EntityId, String> {
    EntityId::parse_with_prefix(s, EntityPrefix::Task).map_err(|e| e.to_string())
}

pub fn parse_project_id(s: &str) -> std::result::Result<EntityId, String> {
    EntityId::parse_with_prefix(s, EntityPrefix::Prj).map_err(|e| e.to_string())
}

pub fn parse_part_id(s: &str) -> std::result::Result<EntityId, String> {
    EntityId::parse_with_prefix(s, EntityPrefix::Part).map_err(|e| e.to_string())
}

/// Render an optional timestamp as a short local-agnostic string
pub fn format_when(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}
