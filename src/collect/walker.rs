//! Paged walk over a repository's pull requests and review threads.

use tracing::{debug, info, trace, warn};

use super::error::CollectError;
use super::settings::WalkLimits;
use crate::diff::{DiffCache, DiffSource};
use crate::export::{CommentRecord, EligibleThread, PullRequestContext, RecordSink};
use crate::github::models::{CommentNode, PullRequestNode, ReviewThreadNode};
use crate::github::pagination::PageInfo;
use crate::github::{RepositoryId, ReviewThreadSource};
use crate::telemetry::{TelemetryEvent, TelemetrySink};

/// Records between progress milestones.
const PROGRESS_INTERVAL: usize = 20;

/// Counters of one repository walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Records written to the sink.
    pub records: usize,
    /// Pull requests whose threads were walked.
    pub pull_requests: usize,
    /// Pull requests skipped by the cutoff.
    pub skipped_pull_requests: usize,
    /// Threads dropped by the eligibility filters.
    pub skipped_threads: usize,
}

/// Walks pull requests, then review threads, then comments, emitting one
/// [`CommentRecord`] per eligible thread in discovery order.
///
/// Diffs are resolved lazily on the first eligible thread of a pull request
/// and released once the pull request is done.
pub struct ThreadWalker<'a, D> {
    source: &'a dyn ReviewThreadSource,
    diffs: DiffCache<D>,
    repository: &'a RepositoryId,
    limits: WalkLimits,
    telemetry: &'a dyn TelemetrySink,
}

impl<'a, D: DiffSource> ThreadWalker<'a, D> {
    /// Creates a walker over `repository`.
    #[must_use]
    pub fn new(
        source: &'a dyn ReviewThreadSource,
        diffs: D,
        repository: &'a RepositoryId,
        limits: WalkLimits,
        telemetry: &'a dyn TelemetrySink,
    ) -> Self {
        Self {
            source,
            diffs: DiffCache::new(diffs),
            repository,
            limits,
            telemetry,
        }
    }

    /// Walks the repository, writing records into `sink`.
    ///
    /// `stats` is updated as the walk progresses so the count of written
    /// records survives a failure part-way through.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError`] on API, diff or sink failures.
    pub fn walk(
        &mut self,
        sink: &mut dyn RecordSink,
        stats: &mut WalkStats,
    ) -> Result<(), CollectError> {
        let mut after: Option<String> = None;
        loop {
            let Some(page) = self.source.pull_request_page(self.repository, after.take())? else {
                warn!(repository = %self.repository, "repository not found or inaccessible");
                return Ok(());
            };
            for pull_request in page.nodes.into_iter().flatten() {
                if self.limits.budget_reached(stats.records) {
                    return Ok(());
                }
                if !self.limits.cutoff.admits(pull_request.created_at.as_deref()) {
                    debug!(
                        repository = %self.repository,
                        pull_request = pull_request.number,
                        "skipping pull request created after the cutoff"
                    );
                    stats.skipped_pull_requests = stats.skipped_pull_requests.saturating_add(1);
                    continue;
                }
                let number = pull_request.number;
                stats.pull_requests = stats.pull_requests.saturating_add(1);
                let walked = self.walk_pull_request(pull_request, sink, stats);
                self.diffs.release(number);
                walked?;
            }
            if self.limits.budget_reached(stats.records) {
                return Ok(());
            }
            let Some(cursor) = page.page_info.next_cursor() else {
                return Ok(());
            };
            info!(
                repository = %self.repository,
                records = stats.records,
                pull_requests = stats.pull_requests,
                "advancing to the next pull request page"
            );
            after = Some(cursor.to_owned());
        }
    }

    fn walk_pull_request(
        &mut self,
        pull_request: PullRequestNode,
        sink: &mut dyn RecordSink,
        stats: &mut WalkStats,
    ) -> Result<(), CollectError> {
        let context = PullRequestContext::from_node(&pull_request, self.repository);
        let mut connection = pull_request.review_threads;
        loop {
            for thread in connection.nodes.into_iter().flatten() {
                if self.limits.budget_reached(stats.records) {
                    return Ok(());
                }
                self.walk_thread(&context, thread, sink, stats)?;
            }
            if self.limits.budget_reached(stats.records) {
                return Ok(());
            }
            let Some(cursor) = connection.page_info.next_cursor().map(ToOwned::to_owned) else {
                return Ok(());
            };
            match self
                .source
                .review_thread_page(self.repository, context.number, Some(cursor))?
            {
                Some(next) => connection = next,
                None => {
                    warn!(
                        repository = %self.repository,
                        pull_request = context.number,
                        "pull request vanished while paging review threads"
                    );
                    return Ok(());
                }
            }
        }
    }

    fn walk_thread(
        &mut self,
        context: &PullRequestContext,
        thread: ReviewThreadNode,
        sink: &mut dyn RecordSink,
        stats: &mut WalkStats,
    ) -> Result<(), CollectError> {
        let path = thread.path.as_deref();
        let mut comments: Vec<CommentNode> = thread.comments.nodes.into_iter().flatten().collect();
        if self.eligible(context, path, &comments, stats).is_none() {
            return Ok(());
        }
        if let Some(id) = thread.id.as_deref() {
            self.remaining_comments(id, thread.comments.page_info, &mut comments)?;
        }
        let Some(eligible) = self.eligible(context, path, &comments, stats) else {
            return Ok(());
        };

        let bundle = self.diffs.resolve(&context.commits())?;
        let record = CommentRecord::build(context, &eligible, bundle);
        sink.write_record(&record)?;
        stats.records = stats.records.saturating_add(1);

        if stats.records.checked_rem(PROGRESS_INTERVAL) == Some(0) {
            info!(repository = %self.repository, records = stats.records, "collected records");
            self.telemetry.record(TelemetryEvent::RecordsCollected {
                repository: self.repository.to_string(),
                records: stats.records,
            });
        }
        Ok(())
    }

    fn eligible<'c>(
        &self,
        context: &PullRequestContext,
        path: Option<&'c str>,
        comments: &'c [CommentNode],
        stats: &mut WalkStats,
    ) -> Option<EligibleThread<'c>> {
        match EligibleThread::check(path, comments, self.limits.require_diff_hunk) {
            Ok(thread) => Some(thread),
            Err(reason) => {
                trace!(
                    repository = %self.repository,
                    pull_request = context.number,
                    "skipping thread: {reason}"
                );
                stats.skipped_threads = stats.skipped_threads.saturating_add(1);
                None
            }
        }
    }

    /// Appends the comments beyond the first page of thread `id`.
    fn remaining_comments(
        &self,
        id: &str,
        first_page: PageInfo,
        comments: &mut Vec<CommentNode>,
    ) -> Result<(), CollectError> {
        let mut page_info = first_page;
        while let Some(cursor) = page_info.next_cursor().map(ToOwned::to_owned) {
            let Some(connection) = self.source.comment_page(id, Some(cursor))? else {
                warn!(repository = %self.repository, thread = id, "thread vanished while paging comments");
                return Ok(());
            };
            comments.extend(connection.nodes.into_iter().flatten());
            page_info = connection.page_info;
        }
        Ok(())
    }
}
