//! Error types for diff resolution.

use thiserror::Error;

use crate::github::ApiError;
use crate::local::MirrorError;

/// Errors raised while resolving a pull request's diff.
///
/// Missing commits in the local strategy are not errors; they degrade to an
/// empty bundle instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiffError {
    /// The REST file listing failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The local mirror could not be opened.
    #[error(transparent)]
    Mirror(#[from] MirrorError),

    /// A git operation on the mirror failed.
    #[error("git diff failed: {message}")]
    Git {
        /// Error detail from the git2 library.
        message: String,
    },
}

impl From<git2::Error> for DiffError {
    fn from(error: git2::Error) -> Self {
        Self::Git {
            message: error.message().to_owned(),
        }
    }
}
