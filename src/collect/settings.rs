//! Validated run settings.

use camino::Utf8PathBuf;

use super::cutoff::Cutoff;
use crate::diff::DiffStrategy;
use crate::export::OutputFormat;
use crate::github::query::QuerySet;
use crate::github::{PersonalAccessToken, RepositoryId, RetryPolicy};

/// Per-repository walk limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkLimits {
    /// Record budget per repository; `None` is unlimited.
    pub max_records: Option<usize>,
    /// Pull requests created after this are skipped.
    pub cutoff: Cutoff,
    /// Drop threads whose first comment has no diff hunk.
    pub require_diff_hunk: bool,
}

impl WalkLimits {
    /// Returns true once `records` has used up the budget.
    #[must_use]
    pub const fn budget_reached(&self, records: usize) -> bool {
        match self.max_records {
            Some(max) => records >= max,
            None => false,
        }
    }
}

/// Everything a collection run needs, validated up front.
#[derive(Debug, Clone)]
pub struct CollectionSettings {
    /// GitHub token.
    pub token: PersonalAccessToken,
    /// Repositories to collect, deduplicated.
    pub repositories: Vec<RepositoryId>,
    /// Directory receiving one output file per repository.
    pub output_dir: Utf8PathBuf,
    /// Output file format.
    pub output_format: OutputFormat,
    /// Directory holding bare mirrors.
    pub clone_dir: Utf8PathBuf,
    /// How pull request diffs are produced.
    pub diff_strategy: DiffStrategy,
    /// Worker threads in the pool.
    pub workers: usize,
    /// Walk limits applied to every repository.
    pub limits: WalkLimits,
    /// Requests admitted per rolling hour across all workers.
    pub hourly_request_cap: u32,
    /// Retry policy for API calls.
    pub retry: RetryPolicy,
    /// Rendered GraphQL queries.
    pub queries: QuerySet,
    /// GitHub API base URL.
    pub api_base: String,
    /// Base URL mirrors are cloned from.
    pub git_base_url: String,
}
