//! Reviewmine CLI entrypoint.

use std::io::{self, Write};
use std::process::ExitCode;

use ortho_config::OrthoConfig;
use reviewmine::{CollectError, ConfigError, ReviewMineConfig, RunSummary};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "REVIEWMINE_LOG";
const DEFAULT_LOG_FILTER: &str = "reviewmine=info";

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Collect(#[from] CollectError),
    #[error("failed to write summary: {0}")]
    Output(#[from] io::Error),
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let config = ReviewMineConfig::load().map_err(|error| ConfigError::Load {
        message: error.to_string(),
    })?;
    let telemetry = config.telemetry_sink()?;
    let settings = config.into_settings()?;
    tracing::info!(
        repositories = settings.repositories.len(),
        workers = settings.workers,
        strategy = %settings.diff_strategy,
        format = %settings.output_format,
        "configuration loaded"
    );

    let summary = reviewmine::run(&settings, telemetry.as_ref())?;
    write_summary(&summary)?;
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ignored = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn write_summary(summary: &RunSummary) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{summary}")
}
