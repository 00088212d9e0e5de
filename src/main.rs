use clap::Parser;
use scenario_sync::cli::commands::{cmd_dedupe, cmd_diag, cmd_export, cmd_preview, cmd_sync};
use scenario_sync::cli::config::{Cli, Commands, load_config};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Resolve settings: CLI > env > config file > defaults
    let mut config = load_config(cli.config.as_deref())?;
    config.apply_env(|name| std::env::var(name).ok())?;
    config.apply_cli(&cli);

    let ok = match cli.command {
        Commands::Sync {
            ref issue,
            ref project,
            max_tests,
            ref link_type,
            prefer,
            ref generator,
            ref journal,
        } => cmd_sync(
            &config,
            cli.format,
            issue,
            project.as_deref(),
            max_tests,
            link_type.as_deref(),
            prefer,
            generator.as_deref(),
            journal.as_deref(),
        )?,
        Commands::Dedupe {
            ref issue,
            ref project,
            prefer,
        } => cmd_dedupe(&config, cli.format, issue, project.as_deref(), prefer)?,
        Commands::Preview {
            ref issue,
            ref project,
            max_tests,
            ref generator,
        } => {
            cmd_preview(
                &config,
                cli.format,
                issue,
                project.as_deref(),
                max_tests,
                generator.as_deref(),
            )?;
            true
        }
        Commands::Export {
            ref issue,
            ref project,
            ref output_dir,
        } => {
            cmd_export(&config, cli.format, issue, project.as_deref(), output_dir)?;
            true
        }
        Commands::Diag => {
            cmd_diag(&config, cli.format)?;
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
