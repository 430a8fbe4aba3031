//! Domain-specific types for git operations.

use std::fmt;

/// A git commit SHA as reported by GitHub.
///
/// The wrapper keeps commit identifiers apart from other strings and
/// rejects blank values, which GitHub sends for pull requests whose base or
/// head branch has been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitSha(String);

impl CommitSha {
    /// Creates a `CommitSha` from a non-blank string.
    #[must_use]
    pub fn parse(sha: &str) -> Option<Self> {
        let trimmed = sha.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// Returns the SHA as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitSha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CommitSha {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
