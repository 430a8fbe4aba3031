//! Error types for the local git mirror.

use thiserror::Error;

/// Errors raised while cloning, verifying or refreshing a local mirror.
///
/// All variants are fatal for the repository being processed; other
/// repositories in the run are unaffected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MirrorError {
    /// Cloning failed; any partial directory has been removed.
    #[error("failed to clone {repository}: {message}")]
    Clone {
        /// Repository being cloned (`owner/name`).
        repository: String,
        /// Error detail from git.
        message: String,
    },

    /// The clone exists but its history cannot be read.
    #[error("mirror of {repository} failed verification: {message}")]
    Verify {
        /// Repository being verified.
        repository: String,
        /// Error detail from git.
        message: String,
    },

    /// The pull request refs could not be fetched.
    #[error("failed to fetch pull request refs for {repository}: {message}")]
    FetchPullRefs {
        /// Repository being refreshed.
        repository: String,
        /// Error detail from git.
        message: String,
    },

    /// A filesystem operation on the clone directory failed.
    #[error("filesystem error at {path}: {message}")]
    Io {
        /// Path that could not be created or removed.
        path: String,
        /// I/O error detail.
        message: String,
    },

    /// Any other git operation failed.
    #[error("git error: {message}")]
    Git {
        /// Error detail from the git2 library.
        message: String,
    },
}

impl From<git2::Error> for MirrorError {
    fn from(error: git2::Error) -> Self {
        Self::Git {
            message: error.message().to_owned(),
        }
    }
}
