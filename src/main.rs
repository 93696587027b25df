use clap::{Parser, ValueEnum};
use miette::{IntoDiagnostic, Result};
use shop::cli::helpers::discover_project;
use shop::cli::{Cli, Commands, OutputFormat};
use shop::core::Config;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging(verbose: bool) -> Result<()> {
    // SHOP_LOG takes the usual filter syntax, e.g. SHOP_LOG=shop=trace
    let filter = EnvFilter::try_from_env("SHOP_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "shop=debug" } else { "shop=warn" })
    });

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).into_diagnostic()
}

fn main() -> Result<()> {
    // Terminate quietly on a closed pipe (`shop proc list | head`)
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let mut global = cli.global;
    init_logging(global.verbose)?;

    let project = discover_project(&global).ok();
    let config = Config::load_for(project.as_ref());
    if global.format == OutputFormat::Auto {
        let configured = config
            .default_format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok());
        if let Some(format) = configured {
            global.format = format;
        }
    }
    global.config = Some(config);

    match cli.command {
        Commands::Init(args) => shop::cli::commands::init::run(args),
        Commands::Proc(cmd) => shop::cli::commands::proc::run(cmd, &global),
        Commands::Step(cmd) => shop::cli::commands::step::run(cmd, &global),
        Commands::Check(cmd) => shop::cli::commands::check::run(cmd, &global),
        Commands::Status(args) => shop::cli::commands::status::run(args, &global),
        Commands::Completions(args) => shop::cli::commands::completions::run(args),
    }
}
