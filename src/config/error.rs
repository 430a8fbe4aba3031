//! Startup configuration failures.

use thiserror::Error;

/// Errors that stop the process before any repository is collected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Layered configuration could not be loaded.
    #[error("failed to load configuration: {message}")]
    Load {
        /// Loader error detail.
        message: String,
    },

    /// No token was configured.
    #[error("GitHub token is required (use --token, REVIEWMINE_TOKEN or GITHUB_TOKEN)")]
    MissingToken,

    /// No repository list was configured.
    #[error("repository list is required (use --repos-file or REVIEWMINE_REPOS_FILE)")]
    MissingRepositoryList,

    /// The repository list could not be read.
    #[error("failed to read repository list '{path}': {message}")]
    RepositoryList {
        /// Configured path.
        path: String,
        /// I/O error detail.
        message: String,
    },

    /// The repository list holds no usable identifiers.
    #[error("repository list '{path}' contains no repositories")]
    EmptyRepositoryList {
        /// Configured path.
        path: String,
    },

    /// A value failed validation.
    #[error("invalid {field}: {message}")]
    Invalid {
        /// Configuration key.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}
