//! Repository collection: walking threads, running workers, reporting.
//!
//! [`run`] wires the shared collaborators together: one rate limiter and
//! API client for the whole process, a mirror manager, and a pool that runs
//! a [`RepoWorker`] per repository. Each worker owns its repository's
//! output file, mirror directory and diff cache exclusively.

use std::sync::Arc;

use crate::github::{GitHubClient, GraphQlThreadSource, RateLimiter};
use crate::local::GitMirror;
use crate::telemetry::TelemetrySink;

mod cutoff;
mod error;
mod pool;
mod settings;
mod summary;
mod walker;
mod worker;

pub use cutoff::{Cutoff, parse_timestamp};
pub use error::CollectError;
pub use pool::PoolOrchestrator;
pub use settings::{CollectionSettings, WalkLimits};
pub use summary::RunSummary;
pub use walker::{ThreadWalker, WalkStats};
pub use worker::{RepoWorker, RepositoryOutcome};

/// Collects every configured repository.
///
/// # Errors
///
/// Returns [`CollectError::Api`] when the API client cannot be built.
/// Per-repository failures are reported in the summary instead.
pub fn run(
    settings: &CollectionSettings,
    telemetry: &dyn TelemetrySink,
) -> Result<RunSummary, CollectError> {
    let limiter = Arc::new(RateLimiter::hourly(settings.hourly_request_cap));
    let client = GitHubClient::new(
        settings.token.clone(),
        &settings.api_base,
        limiter,
        settings.retry,
    )?;
    let threads = GraphQlThreadSource::new(client.clone(), Arc::new(settings.queries.clone()));
    let mirror = GitMirror::new(
        settings.clone_dir.clone(),
        settings.git_base_url.clone(),
        Some(settings.token.clone()),
    );
    let worker = RepoWorker::new(settings, &threads, &client, &mirror, telemetry);
    let pool = PoolOrchestrator::new(settings.workers, telemetry);
    Ok(pool.run(&settings.repositories, &|repository| worker.run(repository)))
}
