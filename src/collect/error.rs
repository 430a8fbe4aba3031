//! Repository-level collection failures.

use thiserror::Error;

use crate::diff::DiffError;
use crate::export::SinkError;
use crate::github::ApiError;
use crate::local::MirrorError;

/// Anything that stops one repository's collection.
///
/// Errors are recorded against the repository; other repositories keep
/// running.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CollectError {
    /// GitHub API failure, including exhausted retries.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The local mirror could not be made ready.
    #[error(transparent)]
    Mirror(#[from] MirrorError),

    /// A pull request diff could not be resolved.
    #[error(transparent)]
    Diff(#[from] DiffError),

    /// The output file could not be opened or written.
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// The worker thread panicked while processing the repository.
    #[error("repository worker panicked: {message}")]
    WorkerPanicked {
        /// Panic payload, when it was a string.
        message: String,
    },
}
