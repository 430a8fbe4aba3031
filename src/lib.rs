//! Reviewmine library crate: collects line-anchored GitHub review threads
//! with their diff context as JSON datasets.
//!
//! A run reads a list of `owner/name` repositories and fans them out over a
//! bounded worker pool. Each worker pages through the repository's pull
//! requests, review threads and comments over GraphQL, resolves every pull
//! request's diff from a local bare mirror or the REST file listing, and
//! streams one [`CommentRecord`] per eligible thread into the repository's
//! output file. All workers share one rate limiter.

pub mod collect;
pub mod config;
pub mod diff;
pub mod export;
pub mod github;
pub mod local;
pub mod telemetry;

pub use collect::{CollectError, CollectionSettings, RunSummary, run};
pub use config::{ConfigError, ReviewMineConfig};
pub use export::CommentRecord;
pub use github::{ApiError, PersonalAccessToken, RepositoryId};
