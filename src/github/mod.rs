//! GitHub API access for review-thread collection.
//!
//! This module wraps a blocking `reqwest` client behind a shared request
//! quota and a bounded retry loop, decodes the GraphQL pages the collector
//! walks, and extracts the issue references found in pull request text.
//! Errors are mapped into [`ApiError`] variants that distinguish transient
//! failures from the ones retrying cannot fix.

pub mod client;
pub mod error;
pub mod graphql;
pub mod issues;
pub mod locator;
pub mod models;
pub mod pagination;
pub mod query;
pub mod rate_limit;
pub mod retry;
pub mod threads;

pub use client::GitHubClient;
pub use error::ApiError;
pub use issues::{LinkedIssue, extract_linked_issues};
pub use locator::{PersonalAccessToken, RepositoryId};
pub use rate_limit::{RateLimitInfo, RateLimiter};
pub use retry::RetryPolicy;
pub use threads::{GraphQlThreadSource, ReviewThreadSource};

#[cfg(test)]
pub use threads::MockReviewThreadSource;
