//! Diffs computed from a local bare mirror.

use std::fmt;

use git2::{Commit, Diff, DiffFormat, DiffOptions, Repository, Tree};
use tracing::{debug, warn};

use super::{DiffBundle, DiffError, DiffSource, PullRequestCommits};
use crate::local::{CommitSha, MirrorHandle};

/// [`DiffSource`] reading commits from a verified mirror.
///
/// Commits missing from the mirror are fetched once by SHA; if they are
/// still missing the pull request gets [`DiffBundle::empty`].
pub struct LocalDiffSource {
    handle: MirrorHandle,
    repo: Repository,
}

impl fmt::Debug for LocalDiffSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalDiffSource")
            .field("handle", &self.handle)
            .field("repo", &"<git2::Repository>")
            .finish()
    }
}

impl LocalDiffSource {
    /// Opens the mirror behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::Mirror`] when the mirror cannot be opened.
    pub fn open(handle: MirrorHandle) -> Result<Self, DiffError> {
        let repo = handle.open()?;
        Ok(Self { handle, repo })
    }

    fn find_commit(&self, sha: &CommitSha) -> Option<Commit<'_>> {
        self.repo
            .revparse_single(sha.as_str())
            .and_then(|object| object.peel_to_commit())
            .ok()
    }

    /// Looks `sha` up, fetching it once from the remote when absent.
    fn locate(&self, number: u64, sha: &CommitSha) -> Option<Commit<'_>> {
        if let Some(commit) = self.find_commit(sha) {
            return Some(commit);
        }
        debug!(pull_request = number, %sha, "commit missing from mirror, fetching");
        if let Err(error) = self.handle.fetch_commit(&self.repo, sha) {
            debug!(pull_request = number, %sha, "targeted fetch failed: {error}");
        }
        self.find_commit(sha)
    }
}

impl DiffSource for LocalDiffSource {
    fn resolve(&self, pull_request: &PullRequestCommits) -> Result<DiffBundle, DiffError> {
        let number = pull_request.number;
        let (Some(base_sha), Some(head_sha)) = (&pull_request.base, &pull_request.head) else {
            warn!(pull_request = number, "pull request lacks base or head commit");
            return Ok(DiffBundle::empty());
        };
        let (Some(base), Some(head)) = (self.locate(number, base_sha), self.locate(number, head_sha))
        else {
            warn!(
                repository = %self.handle.repository(),
                pull_request = number,
                base = %base_sha,
                head = %head_sha,
                "commits unavailable locally, using an empty diff"
            );
            return Ok(DiffBundle::empty());
        };

        let base_tree = base.tree()?;
        let head_tree = head.tree()?;
        let diff = self
            .repo
            .diff_tree_to_tree(Some(&base_tree), Some(&head_tree), None)?;
        let pr_diff = render_patch(&diff)?;

        let mut bundle = DiffBundle {
            pr_diff,
            ..DiffBundle::default()
        };
        for path in changed_paths(&diff) {
            let patch = file_patch(&self.repo, &base_tree, &head_tree, &path);
            if let Err(error) = &patch {
                warn!(pull_request = number, path = %path, "per-file diff failed: {error}");
            }
            bundle.file_diffs.insert(path, patch.ok());
        }
        Ok(bundle)
    }
}

/// Paths touched by `diff`, preferring the new path of renamed files.
fn changed_paths(diff: &Diff<'_>) -> Vec<String> {
    diff.deltas()
        .filter_map(|delta| {
            delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|path| path.to_string_lossy().into_owned())
        })
        .collect()
}

/// Creates a diff for a single file between two trees.
fn file_patch(
    repo: &Repository,
    old_tree: &Tree<'_>,
    new_tree: &Tree<'_>,
    file_path: &str,
) -> Result<String, git2::Error> {
    let mut diff_opts = DiffOptions::new();
    diff_opts.pathspec(file_path).disable_pathspec_match(true);
    let diff = repo.diff_tree_to_tree(Some(old_tree), Some(new_tree), Some(&mut diff_opts))?;
    render_patch(&diff)
}

/// Prints `diff` as unified patch text.
fn render_patch(diff: &Diff<'_>) -> Result<String, git2::Error> {
    let mut text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if matches!(origin, '+' | '-' | ' ') {
            text.push(origin);
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })?;
    Ok(text)
}
