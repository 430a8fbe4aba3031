//! Repository identifiers, credentials, and the repository list reader.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use super::error::ApiError;

/// An `owner/name` pair keying one output file and one local clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryId {
    owner: String,
    name: String,
}

impl RepositoryId {
    /// Creates an identifier from its two halves.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRepository`] when either half is blank.
    pub fn new(owner: &str, name: &str) -> Result<Self, ApiError> {
        let owner_value = owner.trim();
        let name_value = name.trim();
        if owner_value.is_empty() || name_value.is_empty() {
            return Err(ApiError::InvalidRepository {
                identifier: format!("{owner}/{name}"),
            });
        }
        Ok(Self {
            owner: owner_value.to_owned(),
            name: name_value.to_owned(),
        })
    }

    /// Parses an `owner/name` identifier.
    ///
    /// Everything after the first `/` is treated as the repository name.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRepository`] when no `/` separates two
    /// non-empty halves.
    pub fn parse(identifier: &str) -> Result<Self, ApiError> {
        let (owner, name) =
            identifier
                .split_once('/')
                .ok_or_else(|| ApiError::InvalidRepository {
                    identifier: identifier.to_owned(),
                })?;
        Self::new(owner, name)
    }

    /// Borrow the owner.
    #[must_use]
    pub const fn owner(&self) -> &str {
        self.owner.as_str()
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Stable `{owner}_{name}` stem used for output files and clone
    /// directories.
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, ApiError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ApiError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PersonalAccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PersonalAccessToken(<redacted>)")
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Parses repository identifiers from newline-delimited text.
///
/// Blank lines and `#` comments are ignored, malformed identifiers are
/// skipped with a warning, and duplicates keep their first position.
#[must_use]
pub fn parse_repository_list(contents: &str) -> Vec<RepositoryId> {
    let mut seen = HashSet::new();
    let mut repositories = Vec::new();

    for line in contents.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }
        match RepositoryId::parse(stripped) {
            Ok(repository) => {
                if seen.insert(repository.clone()) {
                    repositories.push(repository);
                }
            }
            Err(error) => tracing::warn!("skipping repository list entry: {error}"),
        }
    }

    repositories
}

/// Reads and parses the repository list file at `path`.
///
/// # Errors
///
/// Returns the underlying I/O error when the file cannot be read.
pub fn read_repository_list(path: &Path) -> std::io::Result<Vec<RepositoryId>> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_repository_list(&contents))
}
