//! Errors raised while writing comment records.

use thiserror::Error;

/// Failures of a [`RecordSink`](super::RecordSink).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    /// The output directory or file could not be prepared.
    #[error("failed to open output '{path}': {message}")]
    Open {
        /// Directory or file being opened.
        path: String,
        /// I/O error detail.
        message: String,
    },

    /// Writing or flushing the output failed.
    #[error("failed to write records: {message}")]
    Write {
        /// I/O error detail.
        message: String,
    },

    /// A record could not be serialised.
    #[error("failed to serialise record: {message}")]
    Serialize {
        /// Serialiser error detail.
        message: String,
    },
}

impl SinkError {
    pub(super) fn write(error: &std::io::Error) -> Self {
        Self::Write {
            message: error.to_string(),
        }
    }

    pub(super) fn serialize(error: &serde_json::Error) -> Self {
        Self::Serialize {
            message: error.to_string(),
        }
    }
}
