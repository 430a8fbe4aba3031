//! Bounded worker pool fanning repositories out to threads.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Instant;

use crossbeam_channel::unbounded;
use tracing::{error, info};

use super::error::CollectError;
use super::summary::RunSummary;
use super::worker::RepositoryOutcome;
use crate::github::RepositoryId;
use crate::telemetry::{TelemetryEvent, TelemetrySink};

/// Runs one job per repository on a fixed number of threads.
///
/// Repositories are queued up front and each thread pulls the next one when
/// it finishes its current job. A failing or panicking job only affects its
/// own outcome. A panic that escapes the job is reported with zero records;
/// [`RepoWorker::run`](super::RepoWorker::run) catches its own panics and
/// keeps the count of records already written.
#[derive(Clone, Copy)]
pub struct PoolOrchestrator<'a> {
    workers: usize,
    telemetry: &'a dyn TelemetrySink,
}

impl<'a> PoolOrchestrator<'a> {
    /// Creates a pool of `workers` threads; zero is treated as one.
    #[must_use]
    pub fn new(workers: usize, telemetry: &'a dyn TelemetrySink) -> Self {
        Self {
            workers: workers.max(1),
            telemetry,
        }
    }

    /// Runs `job` for every repository and gathers the outcomes.
    #[must_use]
    pub fn run<F>(&self, repositories: &[RepositoryId], job: &F) -> RunSummary
    where
        F: Fn(&RepositoryId) -> RepositoryOutcome + Sync,
    {
        let started = Instant::now();
        let (task_tx, task_rx) = unbounded::<&RepositoryId>();
        for repository in repositories {
            if task_tx.send(repository).is_err() {
                break;
            }
        }
        drop(task_tx);

        let threads = self.workers.min(repositories.len()).max(1);
        info!(repositories = repositories.len(), threads, "starting collection");
        let (result_tx, result_rx) = unbounded::<RepositoryOutcome>();
        let outcomes = thread::scope(|scope| {
            for _ in 0..threads {
                let tasks = task_rx.clone();
                let results = result_tx.clone();
                let telemetry = self.telemetry;
                scope.spawn(move || {
                    for repository in tasks.iter() {
                        let outcome = run_one(repository, job, telemetry);
                        if results.send(outcome).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);
            result_rx.iter().collect::<Vec<_>>()
        });

        RunSummary::new(outcomes, started.elapsed())
    }
}

fn run_one<F>(
    repository: &RepositoryId,
    job: &F,
    telemetry: &dyn TelemetrySink,
) -> RepositoryOutcome
where
    F: Fn(&RepositoryId) -> RepositoryOutcome,
{
    telemetry.record(TelemetryEvent::RepositoryStarted {
        repository: repository.to_string(),
    });
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| job(repository))).unwrap_or_else(
        |payload| {
            let message = panic_message(payload.as_ref());
            error!(repository = %repository, "worker panicked: {message}");
            RepositoryOutcome {
                repository: repository.clone(),
                records: 0,
                error: Some(CollectError::WorkerPanicked { message }),
            }
        },
    );
    telemetry.record(TelemetryEvent::RepositoryFinished {
        repository: repository.to_string(),
        records: outcome.records,
        error: outcome.error.as_ref().map(ToString::to_string),
    });
    outcome
}

/// Text of a panic payload, for `WorkerPanicked` outcomes.
pub(super) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}
