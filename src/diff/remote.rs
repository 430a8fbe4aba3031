//! Diffs assembled from the REST pull request file listing.

use super::{DiffBundle, DiffError, DiffSource, PullRequestCommits};
use crate::github::models::PullRequestFile;
use crate::github::{GitHubClient, RepositoryId};

/// Files requested per REST page.
const FILES_PER_PAGE: usize = 100;

/// [`DiffSource`] paging `GET /repos/{owner}/{name}/pulls/{number}/files`.
///
/// The whole-PR diff is the file patches joined by newlines; files without
/// a patch map to `None`.
#[derive(Debug, Clone)]
pub struct RemoteDiffSource {
    client: GitHubClient,
    repository: RepositoryId,
}

impl RemoteDiffSource {
    /// Creates a source for pull requests of `repository`.
    #[must_use]
    pub const fn new(client: GitHubClient, repository: RepositoryId) -> Self {
        Self { client, repository }
    }
}

impl DiffSource for RemoteDiffSource {
    fn resolve(&self, pull_request: &PullRequestCommits) -> Result<DiffBundle, DiffError> {
        let path = format!(
            "repos/{}/{}/pulls/{}/files",
            self.repository.owner(),
            self.repository.name(),
            pull_request.number
        );
        let mut bundle = DiffBundle::default();
        let mut patches: Vec<String> = Vec::new();
        let mut page = 1_u32;

        loop {
            let files: Vec<PullRequestFile> = self.client.rest_get(
                &path,
                &[
                    ("page", page.to_string()),
                    ("per_page", FILES_PER_PAGE.to_string()),
                ],
            )?;
            let received = files.len();
            for file in files {
                if let Some(patch) = &file.patch
                    && !patch.is_empty()
                {
                    patches.push(patch.clone());
                }
                if let Some(filename) = file.filename.filter(|name| !name.is_empty()) {
                    bundle.file_diffs.insert(filename, file.patch);
                }
            }
            if received < FILES_PER_PAGE {
                break;
            }
            page = page.saturating_add(1);
        }

        bundle.pr_diff = patches.join("\n");
        tracing::debug!(
            repository = %self.repository,
            pull_request = pull_request.number,
            files = bundle.file_diffs.len(),
            "resolved diff through REST"
        );
        Ok(bundle)
    }
}
