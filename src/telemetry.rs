//! Collection progress events and sinks.
//!
//! Workers and the pool report repository lifecycle and record milestones
//! as typed events. Sinks decide where they go: nowhere, the `tracing`
//! log, or JSON lines on stderr.

use std::io;

use serde::{Deserialize, Serialize};

/// A structured progress event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A worker picked up a repository.
    RepositoryStarted {
        /// `owner/name` of the repository.
        repository: String,
    },
    /// A repository reached another record milestone.
    RecordsCollected {
        /// `owner/name` of the repository.
        repository: String,
        /// Records written so far.
        records: usize,
    },
    /// A repository finished, successfully or not.
    RepositoryFinished {
        /// `owner/name` of the repository.
        repository: String,
        /// Records written.
        records: usize,
        /// Failure message, `None` on success.
        error: Option<String>,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Logs each event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetrySink;

impl TelemetrySink for TracingTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::RepositoryStarted { repository } => {
                tracing::info!(%repository, "repository started");
            }
            TelemetryEvent::RecordsCollected {
                repository,
                records,
            } => {
                tracing::info!(%repository, records, "records collected");
            }
            TelemetryEvent::RepositoryFinished {
                repository,
                records,
                error: None,
            } => {
                tracing::info!(%repository, records, "repository finished");
            }
            TelemetryEvent::RepositoryFinished {
                repository,
                records,
                error: Some(error),
            } => {
                tracing::warn!(%repository, records, "repository failed: {error}");
            }
        }
    }
}

/// Records telemetry events to stderr as JSON lines (JSONL).
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        let _ignored = writeln_stderr(&serialised);
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}
