//! Pull request diff resolution.
//!
//! A [`DiffBundle`] pairs a pull request's full unified diff with one patch
//! per changed file. Two interchangeable [`DiffSource`] strategies produce
//! it: [`LocalDiffSource`] diffs commits in a bare mirror and
//! [`RemoteDiffSource`] pages through the REST file listing. [`DiffCache`]
//! makes sure each pull request is resolved at most once per repository
//! worker.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::local::CommitSha;

mod error;
mod local;
mod remote;

pub use error::DiffError;
pub use local::LocalDiffSource;
pub use remote::RemoteDiffSource;

/// Whole-PR diff plus per-file patches.
///
/// A file maps to `None` when its patch is unavailable (binary or very
/// large files, or a per-file diff that failed).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffBundle {
    /// Unified diff of the whole pull request.
    pub pr_diff: String,
    /// Patch text keyed by file path.
    pub file_diffs: BTreeMap<String, Option<String>>,
}

impl DiffBundle {
    /// The degraded bundle used when either endpoint commit is unavailable.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the patch for `path` when one was resolved.
    #[must_use]
    pub fn file_diff(&self, path: &str) -> Option<&str> {
        self.file_diffs.get(path).and_then(|patch| patch.as_deref())
    }
}

/// Commit endpoints identifying one pull request's diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestCommits {
    /// Pull request number, the memoisation key.
    pub number: u64,
    /// Base commit, absent when GitHub reports none.
    pub base: Option<CommitSha>,
    /// Head commit, absent when GitHub reports none.
    pub head: Option<CommitSha>,
}

/// Strategy turning a pull request's commits into a [`DiffBundle`].
#[cfg_attr(test, mockall::automock)]
pub trait DiffSource {
    /// Resolves the diff of one pull request.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError`] when the diff cannot be produced at all;
    /// unavailable commits degrade to [`DiffBundle::empty`] instead.
    fn resolve(&self, pull_request: &PullRequestCommits) -> Result<DiffBundle, DiffError>;
}

/// Which [`DiffSource`] a run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiffStrategy {
    /// Diff commits in a local bare mirror.
    #[default]
    Local,
    /// Read patches from the REST file listing.
    Remote,
}

impl FromStr for DiffStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(format!("unknown diff strategy '{other}', expected local or remote")),
        }
    }
}

impl fmt::Display for DiffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Remote => "remote",
        })
    }
}

/// Per-worker memo of resolved bundles keyed by pull request number.
///
/// The cache is owned by exactly one repository worker and is never shared
/// across threads.
#[derive(Debug)]
pub struct DiffCache<S> {
    source: S,
    bundles: HashMap<u64, DiffBundle>,
}

impl<S: DiffSource> DiffCache<S> {
    /// Creates an empty cache in front of `source`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            bundles: HashMap::new(),
        }
    }

    /// Returns the bundle for `pull_request`, resolving it on first use.
    ///
    /// Failures are not cached.
    ///
    /// # Errors
    ///
    /// Propagates the [`DiffError`] of the underlying source.
    pub fn resolve(&mut self, pull_request: &PullRequestCommits) -> Result<&DiffBundle, DiffError> {
        match self.bundles.entry(pull_request.number) {
            Entry::Occupied(cached) => Ok(cached.into_mut()),
            Entry::Vacant(slot) => {
                let bundle = self.source.resolve(pull_request)?;
                Ok(slot.insert(bundle))
            }
        }
    }

    /// Drops the bundle of a pull request that has been fully walked.
    pub fn release(&mut self, number: u64) {
        self.bundles.remove(&number);
    }

    /// Number of bundles currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    /// Returns true when no bundle is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

/// Either diff strategy behind one concrete type.
#[derive(Debug)]
pub enum AnyDiffSource {
    /// Local mirror strategy.
    Local(LocalDiffSource),
    /// REST strategy.
    Remote(RemoteDiffSource),
}

impl DiffSource for AnyDiffSource {
    fn resolve(&self, pull_request: &PullRequestCommits) -> Result<DiffBundle, DiffError> {
        match self {
            Self::Local(source) => source.resolve(pull_request),
            Self::Remote(source) => source.resolve(pull_request),
        }
    }
}
