//! Bare git mirrors holding every pull request's commits.
//!
//! A mirror moves through `absent -> cloning -> verifying -> ready`. A
//! directory that cannot be opened or whose history cannot be read is
//! treated as corrupted, removed and cloned again. Once verified, the
//! `refs/pull/*` namespace is fetched so commits that only exist on fork
//! branches become reachable for diffing.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use git2::Repository;
use git2::build::RepoBuilder;
use tracing::{debug, info, warn};

use super::error::MirrorError;
use super::transport::{fetch_options, remote_url};
use super::types::CommitSha;
use crate::github::{PersonalAccessToken, RepositoryId};

/// Refspecs refreshed on every visit.
const MIRROR_REFSPECS: [&str; 3] = [
    "+refs/heads/*:refs/heads/*",
    "+refs/pull/*/head:refs/pull/*/head",
    "+refs/pull/*/merge:refs/pull/*/merge",
];

/// Clone attempts made before a repository is given up.
const CLONE_ATTEMPTS: u32 = 2;

/// Manages bare clones under one root directory.
#[derive(Debug, Clone)]
pub struct GitMirror {
    clone_root: Utf8PathBuf,
    base_url: String,
    token: Option<PersonalAccessToken>,
}

impl GitMirror {
    /// Creates a manager cloning from `base_url` (e.g. `https://github.com`)
    /// into `clone_root`.
    #[must_use]
    pub fn new(
        clone_root: impl Into<Utf8PathBuf>,
        base_url: impl Into<String>,
        token: Option<PersonalAccessToken>,
    ) -> Self {
        Self {
            clone_root: clone_root.into(),
            base_url: base_url.into(),
            token,
        }
    }

    /// Directory holding the mirror of `repository`.
    #[must_use]
    pub fn clone_path(&self, repository: &RepositoryId) -> Utf8PathBuf {
        self.clone_root
            .join(format!("{}.git", repository.file_stem()))
    }

    /// Ensures a verified mirror of `repository` exists with its pull
    /// request refs fetched.
    ///
    /// An existing healthy mirror is only refreshed, never re-cloned. An
    /// existing mirror that cannot be opened or fails the history probe is
    /// not an error: it is deleted and cloned afresh. Only a failure of
    /// that clone, or of the ref refresh, fails the call.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Clone`] when cloning fails,
    /// [`MirrorError::Verify`] when a fresh clone fails verification twice,
    /// and [`MirrorError::FetchPullRefs`] when the refresh fails.
    pub fn ensure_available(&self, repository: &RepositoryId) -> Result<MirrorHandle, MirrorError> {
        let path = self.clone_path(repository);
        let url = remote_url(&self.base_url, repository.owner(), repository.name());

        let repo = match open_existing(repository, &path) {
            Some(existing) => existing,
            None => self.clone_verified(repository, &path, &url)?,
        };

        self.fetch_refs(&repo, repository, &url)?;
        info!(repository = %repository, path = %path, "mirror ready");

        Ok(MirrorHandle {
            repository: repository.clone(),
            path,
            url,
            token: self.token.clone(),
        })
    }

    fn clone_verified(
        &self,
        repository: &RepositoryId,
        path: &Utf8Path,
        url: &str,
    ) -> Result<Repository, MirrorError> {
        fs::create_dir_all(self.clone_root.as_std_path()).map_err(|error| MirrorError::Io {
            path: self.clone_root.to_string(),
            message: error.to_string(),
        })?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            info!(repository = %repository, attempt, "cloning mirror");
            let repo = self.clone_bare(repository, path, url)?;
            match probe(&repo) {
                Ok(()) => return Ok(repo),
                Err(error) => {
                    drop(repo);
                    remove_dir(path)?;
                    if attempt >= CLONE_ATTEMPTS {
                        return Err(MirrorError::Verify {
                            repository: repository.to_string(),
                            message: error.to_string(),
                        });
                    }
                    warn!(repository = %repository, "fresh clone failed verification: {error}");
                }
            }
        }
    }

    fn clone_bare(
        &self,
        repository: &RepositoryId,
        path: &Utf8Path,
        url: &str,
    ) -> Result<Repository, MirrorError> {
        let mut builder = RepoBuilder::new();
        builder
            .bare(true)
            .fetch_options(fetch_options(self.token.as_ref()));
        builder.clone(url, path.as_std_path()).map_err(|error| {
            if path.exists()
                && let Err(removal) = remove_dir(path)
            {
                warn!(repository = %repository, "could not remove partial clone: {removal}");
            }
            MirrorError::Clone {
                repository: repository.to_string(),
                message: error.message().to_owned(),
            }
        })
    }

    fn fetch_refs(
        &self,
        repo: &Repository,
        repository: &RepositoryId,
        url: &str,
    ) -> Result<(), MirrorError> {
        let fetch_error = |error: git2::Error| MirrorError::FetchPullRefs {
            repository: repository.to_string(),
            message: error.message().to_owned(),
        };
        let mut remote = repo.remote_anonymous(url).map_err(fetch_error)?;
        let mut options = fetch_options(self.token.as_ref());
        remote
            .fetch(&MIRROR_REFSPECS, Some(&mut options), None)
            .map_err(fetch_error)
    }
}

/// A verified mirror owned by one repository worker.
#[derive(Debug, Clone)]
pub struct MirrorHandle {
    repository: RepositoryId,
    path: Utf8PathBuf,
    url: String,
    token: Option<PersonalAccessToken>,
}

impl MirrorHandle {
    /// Repository this mirror belongs to.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryId {
        &self.repository
    }

    /// Location of the bare repository.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Opens the bare repository.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Git`] when the directory is not a repository.
    pub fn open(&self) -> Result<Repository, MirrorError> {
        Ok(Repository::open_bare(self.path.as_std_path())?)
    }

    /// Fetches a single commit by SHA into `repo`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Git`] when the remote refuses or lacks the
    /// commit.
    pub fn fetch_commit(&self, repo: &Repository, sha: &CommitSha) -> Result<(), MirrorError> {
        let mut remote = repo.remote_anonymous(&self.url)?;
        let mut options = fetch_options(self.token.as_ref());
        remote.fetch(&[sha.as_str()], Some(&mut options), None)?;
        Ok(())
    }
}

/// Opens and verifies an existing mirror, discarding it when corrupted.
fn open_existing(repository: &RepositoryId, path: &Utf8Path) -> Option<Repository> {
    if !path.exists() {
        return None;
    }
    let verified = Repository::open_bare(path.as_std_path())
        .map_err(MirrorError::from)
        .and_then(|repo| probe(&repo).map(|()| repo));
    match verified {
        Ok(repo) => {
            debug!(repository = %repository, "reusing existing mirror");
            Some(repo)
        }
        Err(error) => {
            warn!(repository = %repository, "mirror is corrupted, re-cloning: {error}");
            if let Err(removal) = remove_dir(path) {
                warn!(repository = %repository, "could not remove corrupted mirror: {removal}");
            }
            None
        }
    }
}

/// Reads the most recent commit reachable from `HEAD`.
fn probe(repo: &Repository) -> Result<(), MirrorError> {
    let mut walk = repo.revwalk()?;
    walk.push_head()?;
    match walk.next() {
        Some(Ok(_)) => Ok(()),
        Some(Err(error)) => Err(error.into()),
        None => Err(MirrorError::Git {
            message: "HEAD has no commits".to_owned(),
        }),
    }
}

fn remove_dir(path: &Utf8Path) -> Result<(), MirrorError> {
    fs::remove_dir_all(path.as_std_path()).map_err(|error| MirrorError::Io {
        path: path.to_string(),
        message: error.to_string(),
    })
}
