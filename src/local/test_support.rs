//! Helpers for building upstream repositories in tests.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8 as fs;
use git2::{ErrorCode, Oid, Repository};
use tempfile::TempDir;

use super::GitMirror;

/// Error type for test fixtures and helpers.
pub(crate) type TestError = Box<dyn std::error::Error>;

/// A non-bare repository standing in for GitHub, laid out as
/// `{root}/remote/{owner}/{name}.git` so mirrors can clone it by URL.
pub(crate) struct Upstream {
    pub(crate) dir: TempDir,
    pub(crate) repo: Repository,
}

impl Upstream {
    pub(crate) fn create(owner: &str, name: &str) -> Result<Self, TestError> {
        let dir = TempDir::new()?;
        let repo_path = dir.path().join("remote").join(owner).join(format!("{name}.git"));
        let repo = Repository::init(&repo_path)?;
        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;
        Ok(Self { dir, repo })
    }

    pub(crate) fn root(&self) -> Result<Utf8PathBuf, TestError> {
        Utf8PathBuf::from_path_buf(self.dir.path().to_path_buf())
            .map_err(|path| format!("temp dir is not UTF-8: {}", path.display()).into())
    }

    pub(crate) fn base_url(&self) -> Result<String, TestError> {
        Ok(self.root()?.join("remote").into_string())
    }

    pub(crate) fn mirror(&self) -> Result<GitMirror, TestError> {
        Ok(GitMirror::new(self.root()?.join("clones"), self.base_url()?, None))
    }
}

/// Commits `files` on top of `HEAD` through the working tree.
pub(crate) fn commit_files(
    repo: &Repository,
    message: &str,
    files: &[(&str, &str)],
) -> Result<Oid, TestError> {
    let sig = repo.signature()?;
    let mut index = repo.index()?;

    let workdir = repo
        .workdir()
        .ok_or("repository has no working directory")?;
    let workdir_str = workdir.to_str().ok_or("workdir path is not valid UTF-8")?;
    let dir = fs::Dir::open_ambient_dir(workdir_str, cap_std::ambient_authority())?;

    for (path, content) in files {
        let utf8_path = Utf8Path::new(path);
        if let Some(parent) = utf8_path.parent()
            && !parent.as_str().is_empty()
        {
            dir.create_dir_all(parent)?;
        }
        dir.write(utf8_path, content)?;
        index.add_path(utf8_path.as_std_path())?;
    }
    index.write()?;

    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    let parent: Option<git2::Commit<'_>> = match repo.head() {
        Ok(head_ref) => Some(head_ref.peel_to_commit()?),
        Err(e) if e.code() == ErrorCode::UnbornBranch => None,
        Err(e) => return Err(e.into()),
    };
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    Ok(repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?)
}

/// Commits top-level `files` on top of `parent` and points `reference` at
/// the result without touching `HEAD`, the way GitHub publishes
/// `refs/pull/N/head` for fork branches.
pub(crate) fn commit_on_ref(
    repo: &Repository,
    reference: &str,
    parent: Oid,
    message: &str,
    files: &[(&str, &str)],
) -> Result<Oid, TestError> {
    let sig = repo.signature()?;
    let parent_commit = repo.find_commit(parent)?;
    let mut builder = repo.treebuilder(Some(&parent_commit.tree()?))?;
    for (path, content) in files {
        let blob = repo.blob(content.as_bytes())?;
        builder.insert(path, blob, 0o100_644)?;
    }
    let tree = repo.find_tree(builder.write()?)?;
    Ok(repo.commit(Some(reference), &sig, &sig, message, &tree, &[&parent_commit])?)
}
