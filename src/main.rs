//! formfill - profile-driven web form filler
//!
//! Main entry point for the formfill CLI.

mod cli;
mod cmd_config;
mod cmd_page;
mod cmd_profile;
mod pipeline;

use std::path::PathBuf;

use clap::Parser;
use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use formfill_config::{ConfigLoader, ConfigValidator};

use crate::cli::{Cli, Commands};

/// Get the .formfill directory path.
fn formfill_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".formfill"))
        .unwrap_or_else(|| PathBuf::from(".formfill"))
}

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.formfill/logs/ with daily rotation. The
/// console layer writes to stderr so command output stays clean on stdout.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = formfill_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("formfill")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Dropping the guard stops the file writer.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = ConfigLoader::load_or_default(&cli.config)?;
    let state = cli.state.as_deref();

    // `config check` reports problems itself; every other command refuses
    // to run on an invalid file.
    if !matches!(cli.command, Commands::Config { .. }) {
        for warning in ConfigValidator::validate(&config).into_result()? {
            warn!("{}: {}", warning.path, warning.message);
        }
    }

    match cli.command {
        Commands::Fill {
            page,
            output,
            auto,
            json,
        } => cmd_page::handle_fill_command(&config, state, page, output, auto, json).await,
        Commands::Analyze { page, json } => {
            cmd_page::handle_analyze_command(&config, state, page, json).await
        }
        Commands::Frames { page } => cmd_page::handle_frames_command(&config, state, page).await,
        Commands::Stats => cmd_page::handle_stats_command(&config, state).await,
        Commands::Ping => cmd_page::handle_ping_command(&config, state).await,
        Commands::Profile { action } => {
            cmd_profile::handle_profile_command(&config, state, action).await
        }
        Commands::Config { action } => {
            cmd_config::handle_config_command(&config, &cli.config, state, action)
        }
    }
}
