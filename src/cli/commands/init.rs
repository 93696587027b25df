//! `shop init` command - Initialize a new shop project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::core::project::{Project, ProjectError, PROCESS_DIR};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Also initialize a git repository
    #[arg(long)]
    pub git: bool,

    /// Rewrite the default config even if .shop/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    if args.git {
        init_git(&path)?;
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            println!(
                "{} Initialized shop project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!("  📁 {}", style(".shop/").dim());
            println!("  📄 {}", style(".shop/config.yaml").dim());
            println!("  📁 {}", style(format!("{}/", PROCESS_DIR)).dim());
            println!();
            println!("Next steps:");
            println!(
                "  {} Plan your first process",
                style("shop proc new \"Drivetrain plates\" --type machining").yellow()
            );
            println!("  {} See what's on the floor", style("shop status").yellow());
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Shop project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!("Use {} to reinitialize", style("shop init --force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn init_git(path: &Path) -> Result<()> {
    if path.join(".git").exists() {
        println!("{} Git repository already exists", style("✓").green());
        return Ok(());
    }

    let output = std::process::Command::new("git")
        .arg("init")
        .current_dir(path)
        .output()
        .into_diagnostic()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(miette::miette!("Failed to initialize git: {}", stderr));
    }

    println!("{} Initialized git repository", style("✓").green());
    let gitignore_path = path.join(".gitignore");
    if !gitignore_path.exists() {
        std::fs::write(&gitignore_path, "# Short IDs are per-checkout\n/.shop/shortids.json\n")
            .into_diagnostic()?;
    }
    Ok(())
}
