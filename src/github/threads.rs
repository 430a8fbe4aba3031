//! Paged access to pull requests, their review threads and thread comments.
//!
//! [`ReviewThreadSource`] is the seam the thread walker pages through. The
//! GraphQL implementation issues the repository-wide query for pull request
//! pages and the two continuation queries for threads and comments that do
//! not fit on the first page.

use std::sync::Arc;

use serde_json::json;

use super::client::GitHubClient;
use super::error::ApiError;
use super::locator::RepositoryId;
use super::models::{
    CommentConnection, PullRequestConnection, PullRequestThreadsData,
    RepositoryPullRequestsData, ReviewThreadConnection, ThreadCommentsData,
};
use super::query::QuerySet;

/// Source of review-thread pages for one or more repositories.
///
/// Every method returns `Ok(None)` when GitHub answers with a `null`
/// repository, pull request or thread node.
#[cfg_attr(test, mockall::automock)]
pub trait ReviewThreadSource: Send + Sync {
    /// Fetches one page of pull requests, each with its first page of
    /// threads and each thread with its first page of comments.
    fn pull_request_page(
        &self,
        repository: &RepositoryId,
        after: Option<String>,
    ) -> Result<Option<PullRequestConnection>, ApiError>;

    /// Fetches a further page of review threads for one pull request.
    fn review_thread_page(
        &self,
        repository: &RepositoryId,
        number: u64,
        after: Option<String>,
    ) -> Result<Option<ReviewThreadConnection>, ApiError>;

    /// Fetches a further page of comments for one review thread.
    fn comment_page(
        &self,
        thread_id: &str,
        after: Option<String>,
    ) -> Result<Option<CommentConnection>, ApiError>;
}

/// [`ReviewThreadSource`] backed by the GitHub GraphQL API.
#[derive(Debug, Clone)]
pub struct GraphQlThreadSource {
    client: GitHubClient,
    queries: Arc<QuerySet>,
}

impl GraphQlThreadSource {
    /// Creates a source issuing `queries` through `client`.
    #[must_use]
    pub const fn new(client: GitHubClient, queries: Arc<QuerySet>) -> Self {
        Self { client, queries }
    }
}

impl ReviewThreadSource for GraphQlThreadSource {
    fn pull_request_page(
        &self,
        repository: &RepositoryId,
        after: Option<String>,
    ) -> Result<Option<PullRequestConnection>, ApiError> {
        let variables = json!({
            "owner": repository.owner(),
            "name": repository.name(),
            "afterPR": after,
            "afterThread": null,
            "afterComment": null,
        });
        let data: RepositoryPullRequestsData = self
            .client
            .graphql(self.queries.pull_request_threads(), &variables)?;
        Ok(data.repository.map(|found| found.pull_requests))
    }

    fn review_thread_page(
        &self,
        repository: &RepositoryId,
        number: u64,
        after: Option<String>,
    ) -> Result<Option<ReviewThreadConnection>, ApiError> {
        let variables = json!({
            "owner": repository.owner(),
            "name": repository.name(),
            "number": number,
            "afterThread": after,
        });
        let data: PullRequestThreadsData = self
            .client
            .graphql(self.queries.review_thread_page(), &variables)?;
        Ok(data
            .repository
            .and_then(|found| found.pull_request)
            .map(|pull_request| pull_request.review_threads))
    }

    fn comment_page(
        &self,
        thread_id: &str,
        after: Option<String>,
    ) -> Result<Option<CommentConnection>, ApiError> {
        let variables = json!({
            "threadId": thread_id,
            "afterComment": after,
        });
        let data: ThreadCommentsData = self
            .client
            .graphql(self.queries.thread_comment_page(), &variables)?;
        Ok(data.node.map(|thread| thread.comments))
    }
}
