//! One repository's collection run.

use std::panic::{self, AssertUnwindSafe};

use tracing::{error, info};

use super::error::CollectError;
use super::pool::panic_message;
use super::settings::CollectionSettings;
use super::walker::{ThreadWalker, WalkStats};
use crate::diff::{AnyDiffSource, DiffStrategy, LocalDiffSource, RemoteDiffSource};
use crate::export::{RecordSink, open_sink};
use crate::github::{GitHubClient, RepositoryId, ReviewThreadSource};
use crate::local::GitMirror;
use crate::telemetry::TelemetrySink;

/// Result of one repository's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOutcome {
    /// The repository.
    pub repository: RepositoryId,
    /// Records written, including those written before a failure.
    pub records: usize,
    /// Failure that stopped the run, `None` on success.
    pub error: Option<CollectError>,
}

impl RepositoryOutcome {
    /// Returns true when the run finished without error.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Shared collaborators every repository run uses.
#[derive(Clone, Copy)]
pub struct RepoWorker<'a> {
    settings: &'a CollectionSettings,
    threads: &'a dyn ReviewThreadSource,
    client: &'a GitHubClient,
    mirror: &'a GitMirror,
    telemetry: &'a dyn TelemetrySink,
}

impl<'a> RepoWorker<'a> {
    /// Bundles the collaborators of a run.
    #[must_use]
    pub const fn new(
        settings: &'a CollectionSettings,
        threads: &'a dyn ReviewThreadSource,
        client: &'a GitHubClient,
        mirror: &'a GitMirror,
        telemetry: &'a dyn TelemetrySink,
    ) -> Self {
        Self {
            settings,
            threads,
            client,
            mirror,
            telemetry,
        }
    }

    /// Collects `repository` into its output file.
    ///
    /// The output file is opened (and truncated) first, then the mirror is
    /// made ready when the local diff strategy is selected, then the walk
    /// streams records into the file. Every failure is captured in the
    /// returned outcome, panics included; `records` then counts what was
    /// written before the failure.
    #[must_use]
    pub fn run(&self, repository: &RepositoryId) -> RepositoryOutcome {
        let mut stats = WalkStats::default();
        let collected =
            panic::catch_unwind(AssertUnwindSafe(|| self.collect(repository, &mut stats)));
        let error = match collected {
            Ok(result) => result.err(),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(repository = %repository, "collection panicked: {message}");
                Some(CollectError::WorkerPanicked { message })
            }
        };
        info!(
            repository = %repository,
            records = stats.records,
            pull_requests = stats.pull_requests,
            skipped_threads = stats.skipped_threads,
            failed = error.is_some(),
            "repository run complete"
        );
        RepositoryOutcome {
            repository: repository.clone(),
            records: stats.records,
            error,
        }
    }

    fn collect(&self, repository: &RepositoryId, stats: &mut WalkStats) -> Result<(), CollectError> {
        let mut sink: Box<dyn RecordSink> = open_sink(
            &self.settings.output_dir,
            repository,
            self.settings.output_format,
        )?;
        let walked = self.diff_source(repository).and_then(|diffs| {
            let mut walker = ThreadWalker::new(
                self.threads,
                diffs,
                repository,
                self.settings.limits,
                self.telemetry,
            );
            walker.walk(sink.as_mut(), stats)
        });
        let finished = sink.finish();
        walked?;
        finished?;
        Ok(())
    }

    fn diff_source(&self, repository: &RepositoryId) -> Result<AnyDiffSource, CollectError> {
        match self.settings.diff_strategy {
            DiffStrategy::Local => {
                let handle = self.mirror.ensure_available(repository)?;
                Ok(AnyDiffSource::Local(LocalDiffSource::open(handle)?))
            }
            DiffStrategy::Remote => Ok(AnyDiffSource::Remote(RemoteDiffSource::new(
                self.client.clone(),
                repository.clone(),
            ))),
        }
    }
}
