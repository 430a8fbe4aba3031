//! Wire models for the GitHub GraphQL and REST responses.
//!
//! Every node list is `Vec<Option<_>>` and most scalar fields are optional.
//! When a page is cut short by resource limits GitHub nulls whole
//! connections as well as single nodes; connections decode a `null` as an
//! empty page and pull requests without a number are dropped, so consumers
//! only ever skip `None` nodes.

use serde::{Deserialize, Deserializer};

use super::pagination::PageInfo;

/// Decodes `null` (or a missing key, with `#[serde(default)]`) as
/// `T::default()`.
pub(super) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Decodes pull request nodes, turning nodes without a number into `None`.
fn numbered_pull_requests<'de, D>(deserializer: D) -> Result<Vec<Option<PullRequestNode>>, D::Error>
where
    D: Deserializer<'de>,
{
    let nodes: Option<Vec<Option<NumberedPullRequest>>> = Option::deserialize(deserializer)?;
    Ok(nodes
        .unwrap_or_default()
        .into_iter()
        .map(|node| node.and_then(NumberedPullRequest::into_node))
        .collect())
}

#[derive(Deserialize)]
struct NumberedPullRequest {
    number: Option<u64>,
    #[serde(flatten)]
    node: PullRequestNode,
}

impl NumberedPullRequest {
    fn into_node(self) -> Option<PullRequestNode> {
        let number = self.number?;
        Some(PullRequestNode { number, ..self.node })
    }
}

/// `data` of the repository-wide pull request query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryPullRequestsData {
    /// `null` when the repository is missing or inaccessible.
    pub repository: Option<RepositoryPullRequests>,
}

/// Repository node carrying a page of pull requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryPullRequests {
    /// Pull request connection.
    #[serde(default, deserialize_with = "null_as_default")]
    pub pull_requests: PullRequestConnection,
}

/// One page of pull requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestConnection {
    /// Pull requests on this page.
    #[serde(default, deserialize_with = "numbered_pull_requests")]
    pub nodes: Vec<Option<PullRequestNode>>,
    /// Cursor state.
    #[serde(default, deserialize_with = "null_as_default")]
    pub page_info: PageInfo,
}

/// A pull request with its first page of review threads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestNode {
    /// Pull request number, read by the connection decoder.
    #[serde(skip)]
    pub number: u64,
    /// Base commit SHA.
    pub base_ref_oid: Option<String>,
    /// Head commit SHA.
    pub head_ref_oid: Option<String>,
    /// Title.
    pub title: Option<String>,
    /// Description body.
    pub body: Option<String>,
    /// HTML URL.
    pub url: Option<String>,
    /// Creation timestamp as returned by GitHub.
    pub created_at: Option<String>,
    /// First page of review threads.
    #[serde(default, deserialize_with = "null_as_default")]
    pub review_threads: ReviewThreadConnection,
}

/// `data` of the pull-request scoped thread continuation query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PullRequestThreadsData {
    /// `null` when the repository is missing or inaccessible.
    pub repository: Option<RepositoryPullRequest>,
}

/// Repository node carrying a single pull request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryPullRequest {
    /// The requested pull request.
    pub pull_request: Option<PullRequestThreads>,
}

/// Review threads of one pull request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestThreads {
    /// Thread connection.
    #[serde(default, deserialize_with = "null_as_default")]
    pub review_threads: ReviewThreadConnection,
}

/// One page of review threads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewThreadConnection {
    /// Threads on this page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<Option<ReviewThreadNode>>,
    /// Cursor state.
    #[serde(default, deserialize_with = "null_as_default")]
    pub page_info: PageInfo,
}

/// A review thread with its first page of comments.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewThreadNode {
    /// Node id, used to page through long threads.
    pub id: Option<String>,
    /// File the thread is anchored to; `None` for general comments.
    pub path: Option<String>,
    /// First page of comments.
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: CommentConnection,
}

/// `data` of the thread comment continuation query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadCommentsData {
    /// The thread node, `null` if it vanished.
    pub node: Option<ThreadComments>,
}

/// Comments of one thread.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadComments {
    /// Comment connection.
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: CommentConnection,
}

/// One page of review comments.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentConnection {
    /// Comments on this page.
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<Option<CommentNode>>,
    /// Cursor state.
    #[serde(default, deserialize_with = "null_as_default")]
    pub page_info: PageInfo,
}

/// A pull request review comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    /// Node id.
    pub id: Option<String>,
    /// HTML URL.
    pub url: Option<String>,
    /// Markdown body.
    pub body: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<String>,
    /// True when the anchored line changed after the comment was posted.
    pub outdated: Option<bool>,
    /// Diff hunk the comment was placed on.
    pub diff_hunk: Option<String>,
    /// Author, `null` for deleted accounts.
    pub author: Option<Actor>,
    /// Commit the comment was placed on.
    pub commit: Option<CommitRef>,
}

/// A GitHub actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Actor {
    /// Login name.
    pub login: Option<String>,
}

/// A commit reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommitRef {
    /// Commit SHA.
    pub oid: Option<String>,
}

/// One entry of `GET /repos/{owner}/{name}/pulls/{number}/files`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PullRequestFile {
    /// Path of the changed file.
    pub filename: Option<String>,
    /// Unified patch; absent for binary or very large files.
    pub patch: Option<String>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::github::graphql::{GraphQlEnvelope, interpret};

    fn resource_limit_error(path: serde_json::Value) -> serde_json::Value {
        json!({
            "type": "RESOURCE_LIMITS_EXCEEDED",
            "message": "Resource limits for this query exceeded.",
            "path": path
        })
    }

    #[test]
    fn partial_page_with_null_connections_still_decodes() {
        let envelope: GraphQlEnvelope<RepositoryPullRequestsData> = serde_json::from_value(json!({
            "data": {"repository": {"pullRequests": {
                "nodes": [
                    {"number": 1, "reviewThreads": null},
                    {"number": 2, "reviewThreads": {
                        "nodes": [{"id": "T1", "path": "a.rs", "comments": null}],
                        "pageInfo": null
                    }},
                    {"number": null, "title": "lost"}
                ],
                "pageInfo": {"hasNextPage": null, "endCursor": null}
            }}},
            "errors": [
                resource_limit_error(json!(["repository", "pullRequests", "nodes", 0, "reviewThreads"])),
                resource_limit_error(json!(["repository", "pullRequests", "nodes", 1, "reviewThreads", "nodes", 0, "comments"]))
            ]
        }))
        .expect("partial page should decode");

        let data = interpret(envelope).expect("resource limits keep the partial data");
        let connection = data.repository.expect("repository present").pull_requests;
        assert!(connection.page_info.is_last_page());
        assert_eq!(connection.nodes.len(), 3);
        let numbers: Vec<u64> = connection
            .nodes
            .iter()
            .flatten()
            .map(|pull_request| pull_request.number)
            .collect();
        assert_eq!(numbers, [1, 2]);

        let mut pull_requests = connection.nodes.into_iter().flatten();
        let first = pull_requests.next().expect("first pull request");
        assert!(first.review_threads.nodes.is_empty());
        let second = pull_requests.next().expect("second pull request");
        let thread = second
            .review_threads
            .nodes
            .into_iter()
            .flatten()
            .next()
            .expect("one thread");
        assert_eq!(thread.path.as_deref(), Some("a.rs"));
        assert!(thread.comments.nodes.is_empty());
        assert!(thread.comments.page_info.is_last_page());
    }

    #[test]
    fn continuation_pages_tolerate_null_connections() {
        let threads: PullRequestThreadsData = serde_json::from_value(json!({
            "repository": {"pullRequest": {"reviewThreads": null}}
        }))
        .expect("thread continuation should decode");
        let comments: ThreadCommentsData = serde_json::from_value(json!({
            "node": {"comments": {"nodes": null, "pageInfo": null}}
        }))
        .expect("comment continuation should decode");

        let pull_request = threads
            .repository
            .and_then(|repository| repository.pull_request)
            .expect("pull request present");
        assert!(pull_request.review_threads.nodes.is_empty());
        assert!(comments.node.expect("thread present").comments.nodes.is_empty());
    }

    #[test]
    fn pull_request_page_tolerates_null_nodes_and_fields() {
        let data: RepositoryPullRequestsData = serde_json::from_value(json!({
            "repository": {
                "pullRequests": {
                    "nodes": [null, {
                        "number": 7,
                        "baseRefOid": "aaa",
                        "headRefOid": "bbb",
                        "title": null,
                        "body": null,
                        "url": "https://github.com/octo/repo/pull/7",
                        "createdAt": "2024-01-01T00:00:00Z",
                        "reviewThreads": {
                            "nodes": [{
                                "id": "T1",
                                "path": "src/lib.rs",
                                "comments": {
                                    "nodes": [{
                                        "id": "C1",
                                        "body": "nit",
                                        "outdated": true,
                                        "author": null,
                                        "commit": {"oid": "ccc"}
                                    }],
                                    "pageInfo": {"hasNextPage": false, "endCursor": null}
                                }
                            }],
                            "pageInfo": {"hasNextPage": false, "endCursor": null}
                        }
                    }],
                    "pageInfo": {"hasNextPage": true, "endCursor": "PR1"}
                }
            }
        }))
        .expect("page should decode");

        let connection = data.repository.expect("repository present").pull_requests;
        assert_eq!(connection.page_info.next_cursor(), Some("PR1"));
        let pull_request = connection
            .nodes
            .into_iter()
            .flatten()
            .next()
            .expect("one pull request");
        assert_eq!(pull_request.number, 7);
        assert_eq!(pull_request.title, None);

        let thread = pull_request
            .review_threads
            .nodes
            .into_iter()
            .flatten()
            .next()
            .expect("one thread");
        let comment = thread
            .comments
            .nodes
            .into_iter()
            .flatten()
            .next()
            .expect("one comment");
        assert_eq!(comment.outdated, Some(true));
        assert_eq!(comment.author, None);
        assert_eq!(comment.commit.and_then(|commit| commit.oid).as_deref(), Some("ccc"));
    }
}
