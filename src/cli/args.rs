//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    check::CheckCommands, completions::CompletionsArgs, init::InitArgs, proc::ProcCommands,
    status::StatusArgs, step::StepCommands,
};
use crate::core::Config;

#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about = "FRC shop floor manufacturing tracker")]
#[command(long_about = "Track manufacturing processes, their steps and quality checkpoints as plain YAML files next to your robot CAD.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .shop/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Configuration resolved once at startup for the selected project
    #[arg(skip)]
    pub config: Option<Config>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new shop project
    Init(InitArgs),

    /// Manufacturing process management
    #[command(subcommand)]
    Proc(ProcCommands),

    /// Work through the steps of a process
    #[command(subcommand)]
    Step(StepCommands),

    /// Quality checkpoint inspections
    #[command(subcommand)]
    Check(CheckCommands),

    /// Show shop floor status dashboard
    Status(StatusArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (pretty for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}
