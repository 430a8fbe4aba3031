//! Error types exposed by the GitHub API layer.

use thiserror::Error;

/// Errors surfaced while talking to the GitHub GraphQL or REST APIs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The authentication token was missing or blank.
    #[error("personal access token is required")]
    MissingToken,

    /// A repository identifier was not of the form `owner/name`.
    #[error("repository identifier must be owner/name: {identifier}")]
    InvalidRepository {
        /// The rejected identifier.
        identifier: String,
    },

    /// A URL could not be built from the configured base.
    #[error("invalid URL: {message}")]
    InvalidUrl {
        /// Parser error detail.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// GitHub answered with a non-success HTTP status.
    #[error("GitHub returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body or GitHub error message.
        message: String,
    },

    /// GitHub reported that the request was rate limited.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimited {
        /// Error message from GitHub.
        message: String,
    },

    /// The GraphQL payload carried errors that retrying cannot fix.
    #[error("GitHub GraphQL returned errors: {message}")]
    GraphQl {
        /// Joined error messages with their paths.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("could not decode GitHub response: {message}")]
    Decode {
        /// Deserialisation error detail.
        message: String,
    },

    /// Every attempt allowed by the retry policy failed.
    #[error("giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The failure observed on the final attempt.
        last: Box<ApiError>,
    },
}

impl ApiError {
    /// Returns true when the failure is worth another attempt.
    ///
    /// HTTP 403/429, HTTP 5xx, transport errors and rate-limit payloads are
    /// transient; everything else is surfaced immediately.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } | Self::RateLimited { .. } => true,
            Self::Http { status, .. } => matches!(*status, 403 | 429) || *status >= 500,
            _ => false,
        }
    }
}
