//! Heuristic extraction of issues referenced from pull request text.
//!
//! Three passes run in a fixed order over the text: qualified references
//! (`owner/repo#12`), bare numbers (`#12`, resolved against the pull
//! request's own repository) and issue URLs. Results keep first-seen order
//! and are deduplicated on the qualified `owner/repo#N` key.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::locator::RepositoryId;

static QUALIFIED_REFERENCE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?P<owner>[A-Za-z0-9_.-]+)/(?P<repo>[A-Za-z0-9_.-]+)#(?P<num>\d+)").ok()
});

static BARE_REFERENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"#(?P<num>\d+)").ok());

static ISSUE_URL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"https://github\.com/(?P<owner>[A-Za-z0-9_.-]+)/(?P<repo>[A-Za-z0-9_.-]+)/issues/(?P<num>\d+)",
    )
    .ok()
});

/// An issue referenced from a pull request title or body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedIssue {
    /// Reference as written (`#12`) or qualified (`owner/repo#12`).
    pub reference: String,
    /// Browser URL of the issue.
    pub url: String,
}

impl LinkedIssue {
    fn new(reference: String, owner: &str, repo: &str, number: &str) -> Self {
        Self {
            reference,
            url: format!("https://github.com/{owner}/{repo}/issues/{number}"),
        }
    }
}

/// Characters that make a `#` part of a larger token rather than a bare
/// reference.
const fn joins_reference(character: char) -> bool {
    character.is_ascii_alphanumeric() || matches!(character, '_' | '/' | '.' | '-')
}

#[derive(Default)]
struct Collected {
    seen: HashSet<String>,
    issues: Vec<LinkedIssue>,
}

impl Collected {
    fn push(&mut self, key: String, issue: LinkedIssue) {
        if self.seen.insert(key) {
            self.issues.push(issue);
        }
    }
}

/// Extracts linked issues from `text` for a pull request of `repository`.
///
/// # Examples
///
/// ```
/// use reviewmine::github::issues::extract_linked_issues;
/// use reviewmine::github::locator::RepositoryId;
///
/// let repository = RepositoryId::new("octo", "repo").expect("valid repository");
/// let issues = extract_linked_issues("fixes #12 and octo/repo#5", &repository);
/// let references: Vec<_> = issues.iter().map(|issue| issue.reference.as_str()).collect();
/// assert_eq!(references, ["octo/repo#5", "#12"]);
/// ```
#[must_use]
pub fn extract_linked_issues(text: &str, repository: &RepositoryId) -> Vec<LinkedIssue> {
    let mut collected = Collected::default();

    if let Some(pattern) = QUALIFIED_REFERENCE.as_ref() {
        for captures in pattern.captures_iter(text) {
            let (Some(owner), Some(repo), Some(number)) =
                (captures.name("owner"), captures.name("repo"), captures.name("num"))
            else {
                continue;
            };
            let key = format!("{}/{}#{}", owner.as_str(), repo.as_str(), number.as_str());
            let issue = LinkedIssue::new(key.clone(), owner.as_str(), repo.as_str(), number.as_str());
            collected.push(key, issue);
        }
    }

    if let Some(pattern) = BARE_REFERENCE.as_ref() {
        for captures in pattern.captures_iter(text) {
            let (Some(whole), Some(number)) = (captures.get(0), captures.name("num")) else {
                continue;
            };
            let preceding = text
                .get(..whole.start())
                .and_then(|prefix| prefix.chars().next_back());
            if preceding.is_some_and(joins_reference) {
                continue;
            }
            let key = format!("{repository}#{}", number.as_str());
            let issue = LinkedIssue::new(
                format!("#{}", number.as_str()),
                repository.owner(),
                repository.name(),
                number.as_str(),
            );
            collected.push(key, issue);
        }
    }

    if let Some(pattern) = ISSUE_URL.as_ref() {
        for captures in pattern.captures_iter(text) {
            let (Some(owner), Some(repo), Some(number)) =
                (captures.name("owner"), captures.name("repo"), captures.name("num"))
            else {
                continue;
            };
            let key = format!("{}/{}#{}", owner.as_str(), repo.as_str(), number.as_str());
            let issue = LinkedIssue::new(key.clone(), owner.as_str(), repo.as_str(), number.as_str());
            collected.push(key, issue);
        }
    }

    collected.issues
}

/// Joins a pull request title and body into the text scanned for issues.
#[must_use]
pub fn pull_request_text(title: Option<&str>, body: Option<&str>) -> String {
    format!("{}\n{}", title.unwrap_or_default(), body.unwrap_or_default())
}
