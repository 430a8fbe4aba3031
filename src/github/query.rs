//! GraphQL query templates with page sizes substituted in.
//!
//! Page sizes are fixed for a run, so they are written into the query text
//! once rather than passed as variables. Templates use `<PRS_PER_PAGE>`,
//! `<THREADS_PER_PAGE>` and `<COMMENTS_PER_THREAD_PAGE>` placeholders.

use std::fs;
use std::path::Path;

const PULL_REQUEST_THREADS: &str = include_str!("queries/pull_request_threads.graphql");
const REVIEW_THREAD_PAGE: &str = include_str!("queries/review_thread_page.graphql");
const THREAD_COMMENT_PAGE: &str = include_str!("queries/thread_comment_page.graphql");

/// Page sizes for the three nested connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizes {
    /// Pull requests per page.
    pub pull_requests: u32,
    /// Review threads per pull request page.
    pub threads: u32,
    /// Comments per thread page.
    pub comments: u32,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            pull_requests: 25,
            threads: 25,
            comments: 50,
        }
    }
}

/// Substitutes page sizes into a template.
#[must_use]
pub fn render(template: &str, sizes: PageSizes) -> String {
    template
        .replace("<PRS_PER_PAGE>", &sizes.pull_requests.to_string())
        .replace("<THREADS_PER_PAGE>", &sizes.threads.to_string())
        .replace("<COMMENTS_PER_THREAD_PAGE>", &sizes.comments.to_string())
}

/// Ready-to-send query texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySet {
    pull_request_threads: String,
    review_thread_page: String,
    thread_comment_page: String,
}

impl QuerySet {
    /// Renders the embedded templates.
    #[must_use]
    pub fn new(sizes: PageSizes) -> Self {
        Self::with_pull_request_template(PULL_REQUEST_THREADS, sizes)
    }

    /// Renders a custom repository-wide template alongside the embedded
    /// continuation queries.
    #[must_use]
    pub fn with_pull_request_template(template: &str, sizes: PageSizes) -> Self {
        Self {
            pull_request_threads: render(template, sizes),
            review_thread_page: render(REVIEW_THREAD_PAGE, sizes),
            thread_comment_page: render(THREAD_COMMENT_PAGE, sizes),
        }
    }

    /// Loads the repository-wide template from `path` when given.
    ///
    /// # Errors
    ///
    /// Returns the I/O error when the template file cannot be read.
    pub fn load(path: Option<&Path>, sizes: PageSizes) -> std::io::Result<Self> {
        match path {
            Some(template_path) => {
                let template = fs::read_to_string(template_path)?;
                Ok(Self::with_pull_request_template(&template, sizes))
            }
            None => Ok(Self::new(sizes)),
        }
    }

    /// Query accepting `{owner, name, afterPR, afterThread, afterComment}`.
    #[must_use]
    pub fn pull_request_threads(&self) -> &str {
        &self.pull_request_threads
    }

    /// Query accepting `{owner, name, number, afterThread}`.
    #[must_use]
    pub fn review_thread_page(&self) -> &str {
        &self.review_thread_page
    }

    /// Query accepting `{threadId, afterComment}`.
    #[must_use]
    pub fn thread_comment_page(&self) -> &str {
        &self.thread_comment_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_templates_have_no_placeholders_after_render() {
        let queries = QuerySet::new(PageSizes::default());
        for text in [
            queries.pull_request_threads(),
            queries.review_thread_page(),
            queries.thread_comment_page(),
        ] {
            assert!(!text.contains('<'), "unrendered placeholder in {text}");
        }
        assert!(queries.pull_request_threads().contains("pullRequests(first: 25"));
        assert!(queries.pull_request_threads().contains("comments(first: 50"));
    }

    #[test]
    fn render_substitutes_each_size() {
        let sizes = PageSizes {
            pull_requests: 1,
            threads: 2,
            comments: 3,
        };
        let rendered = render(
            "<PRS_PER_PAGE> <THREADS_PER_PAGE> <COMMENTS_PER_THREAD_PAGE>",
            sizes,
        );
        assert_eq!(rendered, "1 2 3");
    }

    #[test]
    fn load_reads_custom_template() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("custom.graphql");
        std::fs::write(&path, "query { first: <PRS_PER_PAGE> }").expect("write template");

        let queries = QuerySet::load(Some(&path), PageSizes::default()).expect("template loads");

        assert_eq!(queries.pull_request_threads(), "query { first: 25 }");
    }
}
