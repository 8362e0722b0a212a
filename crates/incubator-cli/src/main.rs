use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use time::UtcOffset;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod context;
mod style;
mod util;

use cli::{Cli, Commands, ConfigAction};
use commands::*;
use context::AppContext;

fn main() -> Result<()> {
    // The local offset can only be read safely while single-threaded.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "incubator", &mut io::stdout());
        return Ok(());
    }

    // When quiet mode is enabled, suppress info-level logging
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(!cli.no_color)
        .init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli, offset))
}

async fn run(cli: Cli, offset: UtcOffset) -> Result<()> {
    let ctx = match &cli.command {
        Commands::Config {
            action: ConfigAction::Path | ConfigAction::Init { .. },
        } => AppContext::without_file(&cli, offset),
        _ => AppContext::from_cli(&cli, offset)?,
    };

    if let Some(ref path) = cli.output {
        tracing::debug!("Output will be written to: {}", path.display());
    }

    match cli.command {
        Commands::Species { format } => cmd_species(&ctx, format),
        Commands::Start {
            species,
            eggs,
            notes,
        } => cmd_start(&ctx, &species, eggs, &notes).await,
        Commands::Status { format } => cmd_status(&ctx, format),
        Commands::Fertility { count } => cmd_fertility(&ctx, count),
        Commands::Hatch { count } => cmd_hatch(&ctx, count),
        Commands::Push => cmd_push(&ctx).await,
        Commands::History { format, stats } => cmd_history(&ctx, format, stats),
        Commands::Sensors {
            format,
            file,
            since,
            last,
            summary,
            species,
        } => cmd_sensors(
            &ctx,
            SensorsArgs {
                format,
                file,
                since,
                last,
                summary,
                species,
            },
        ),
        Commands::Import {
            active,
            history,
            format,
        } => cmd_import(&ctx, active, history, format),
        Commands::Config { action } => cmd_config(&ctx, action),
        Commands::Completions { .. } => unreachable!("handled before runtime start"),
    }
}
