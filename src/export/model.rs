//! Comment records and the output format selection.
//!
//! A [`CommentRecord`] is built once per eligible review thread from the
//! thread's first comment, the whole comment sequence, the pull request it
//! belongs to and that pull request's diff. Absent values serialise as
//! `null` so every record carries the same keys.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::diff::{DiffBundle, PullRequestCommits};
use crate::github::models::{CommentNode, PullRequestNode};
use crate::github::{LinkedIssue, RepositoryId, extract_linked_issues, issues::pull_request_text};
use crate::local::CommitSha;

/// One comment of a review thread as it appears in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadMessage {
    /// Author login, `None` for deleted accounts.
    pub author: Option<String>,
    /// Markdown body.
    pub body: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<String>,
    /// HTML URL.
    pub url: Option<String>,
}

impl From<&CommentNode> for ThreadMessage {
    fn from(comment: &CommentNode) -> Self {
        Self {
            author: comment.author.as_ref().and_then(|actor| actor.login.clone()),
            body: comment.body.clone(),
            created_at: comment.created_at.clone(),
            url: comment.url.clone(),
        }
    }
}

/// Why a review thread produced no record.
///
/// These are expected filtering outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The thread is not anchored to a file.
    NoPath,
    /// The thread has no comments.
    NoComments,
    /// The first comment has no diff hunk and hunks are required.
    NoDiffHunk,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoPath => "thread has no file path",
            Self::NoComments => "thread has no comments",
            Self::NoDiffHunk => "first comment has no diff hunk",
        })
    }
}

/// A review thread that passed the eligibility filters.
#[derive(Debug, Clone, Copy)]
pub struct EligibleThread<'a> {
    path: &'a str,
    first: &'a CommentNode,
    comments: &'a [CommentNode],
}

impl<'a> EligibleThread<'a> {
    /// Applies the eligibility filters to a thread.
    ///
    /// # Errors
    ///
    /// Returns the [`SkipReason`] of the first filter the thread fails.
    pub fn check(
        path: Option<&'a str>,
        comments: &'a [CommentNode],
        require_diff_hunk: bool,
    ) -> Result<Self, SkipReason> {
        let path = path.filter(|value| !value.is_empty()).ok_or(SkipReason::NoPath)?;
        let first = comments.first().ok_or(SkipReason::NoComments)?;
        if require_diff_hunk && first.diff_hunk.as_deref().is_none_or(str::is_empty) {
            return Err(SkipReason::NoDiffHunk);
        }
        Ok(Self {
            path,
            first,
            comments,
        })
    }

    /// File the thread is anchored to.
    #[must_use]
    pub const fn path(&self) -> &'a str {
        self.path
    }
}

/// Pull request fields shared by every record of that pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestContext {
    /// Pull request number.
    pub number: u64,
    /// HTML URL.
    pub url: Option<String>,
    /// Base commit SHA.
    pub base_commit: Option<String>,
    /// Head commit SHA.
    pub head_commit: Option<String>,
    /// Title.
    pub title: Option<String>,
    /// Description body.
    pub body: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<String>,
    /// Issues referenced from the title or body.
    pub linked_issues: Vec<LinkedIssue>,
}

impl PullRequestContext {
    /// Builds the context of `node`, extracting its linked issues.
    #[must_use]
    pub fn from_node(node: &PullRequestNode, repository: &RepositoryId) -> Self {
        let text = pull_request_text(node.title.as_deref(), node.body.as_deref());
        Self {
            number: node.number,
            url: node.url.clone(),
            base_commit: node.base_ref_oid.clone(),
            head_commit: node.head_ref_oid.clone(),
            title: node.title.clone(),
            body: node.body.clone(),
            created_at: node.created_at.clone(),
            linked_issues: extract_linked_issues(&text, repository),
        }
    }

    /// Commit endpoints used to resolve this pull request's diff.
    #[must_use]
    pub fn commits(&self) -> PullRequestCommits {
        PullRequestCommits {
            number: self.number,
            base: self.base_commit.as_deref().and_then(CommitSha::parse),
            head: self.head_commit.as_deref().and_then(CommitSha::parse),
        }
    }
}

/// One output record per eligible review thread.
///
/// `resolved` mirrors GitHub's `outdated` flag on the first comment: it is
/// true when the anchored code changed after the comment was posted, not
/// when the thread was marked resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    /// Body of the first comment.
    pub comment_text: Option<String>,
    /// True when the thread has more than one comment.
    pub has_reply: bool,
    /// Every comment of the thread in order.
    pub thread: Vec<ThreadMessage>,
    /// File the thread is anchored to.
    pub file_path: String,
    /// Node id of the first comment.
    pub comment_id: Option<String>,
    /// HTML URL of the first comment.
    pub comment_url: Option<String>,
    /// Commit the first comment was placed on.
    pub comment_commit: Option<String>,
    /// Diff hunk of the first comment.
    pub diff_hunk: Option<String>,
    /// Patch of the anchored file within the pull request.
    pub file_diff: Option<String>,
    /// Unified diff of the whole pull request.
    pub pull_request_diff: String,
    /// GitHub's `outdated` flag of the first comment.
    pub resolved: bool,
    /// Pull request number.
    pub pull_request_number: u64,
    /// Pull request URL.
    pub pull_request_url: Option<String>,
    /// Pull request base commit.
    pub pull_request_base_commit: Option<String>,
    /// Pull request head commit.
    pub pull_request_head_commit: Option<String>,
    /// Pull request title.
    pub pull_request_title: Option<String>,
    /// Pull request body.
    pub pull_request_body: Option<String>,
    /// Pull request creation timestamp.
    pub pull_request_created_at: Option<String>,
    /// Issues linked from the pull request text.
    pub linked_issues: Vec<LinkedIssue>,
    /// Creation timestamp of the first comment.
    pub comment_created_at: Option<String>,
}

impl CommentRecord {
    /// Assembles the record of `thread`.
    #[must_use]
    pub fn build(
        pull_request: &PullRequestContext,
        thread: &EligibleThread<'_>,
        diff: &DiffBundle,
    ) -> Self {
        let first = thread.first;
        Self {
            comment_text: first.body.clone(),
            has_reply: thread.comments.len() > 1,
            thread: thread.comments.iter().map(ThreadMessage::from).collect(),
            file_path: thread.path.to_owned(),
            comment_id: first.id.clone(),
            comment_url: first.url.clone(),
            comment_commit: first.commit.as_ref().and_then(|commit| commit.oid.clone()),
            diff_hunk: first.diff_hunk.clone(),
            file_diff: diff.file_diff(thread.path).map(ToOwned::to_owned),
            pull_request_diff: diff.pr_diff.clone(),
            resolved: first.outdated.unwrap_or(false),
            pull_request_number: pull_request.number,
            pull_request_url: pull_request.url.clone(),
            pull_request_base_commit: pull_request.base_commit.clone(),
            pull_request_head_commit: pull_request.head_commit.clone(),
            pull_request_title: pull_request.title.clone(),
            pull_request_body: pull_request.body.clone(),
            pull_request_created_at: pull_request.created_at.clone(),
            linked_issues: pull_request.linked_issues.clone(),
            comment_created_at: first.created_at.clone(),
        }
    }
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON object per line, flushed per record.
    #[default]
    Jsonl,
    /// A single pretty-printed JSON array.
    Json,
}

impl OutputFormat {
    /// File extension used for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jsonl => "jsonl",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jsonl" | "json-lines" | "jsonlines" => Ok(Self::Jsonl),
            "json" => Ok(Self::Json),
            _ => Err(format!(
                "unsupported output format '{s}': valid options are 'jsonl' or 'json'"
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
