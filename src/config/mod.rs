//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.reviewmine.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `REVIEWMINE_*`, plus legacy `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--repos-file`, `--token`, and friends
//!
//! # Configuration File
//!
//! ```toml
//! repos_file = "repos.txt"
//! output_dir = "comments"
//! output_format = "jsonl"
//! diff_strategy = "local"
//! workers = 4
//! max_comments_per_repo = 0
//! pr_created_before = "2025-12-01T00:00:00Z"
//! ```

use std::env;
use std::path::Path;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::collect::{CollectionSettings, Cutoff, WalkLimits};
use crate::diff::DiffStrategy;
use crate::export::OutputFormat;
use crate::github::locator::read_repository_list;
use crate::github::query::{PageSizes, QuerySet};
use crate::github::{PersonalAccessToken, RepositoryId, RetryPolicy};
use crate::telemetry::{
    NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetrySink, TracingTelemetrySink,
};

mod error;

pub use error::ConfigError;

/// Largest page size GitHub's GraphQL connections accept.
const MAX_PAGE_SIZE: u32 = 100;

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use reviewmine::ReviewMineConfig;
///
/// let config = ReviewMineConfig::load().expect("failed to load configuration");
/// let settings = config.into_settings().expect("invalid configuration");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "REVIEWMINE",
    discovery(
        dotfile_name = ".reviewmine.toml",
        config_file_name = "reviewmine.toml",
        app_name = "reviewmine"
    )
)]
pub struct ReviewMineConfig {
    /// Personal access token for GitHub API and git transport.
    ///
    /// Falls back to `GITHUB_TOKEN` when unset.
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Newline-delimited `owner/name` list.
    #[ortho_config(cli_short = 'r')]
    pub repos_file: Option<String>,

    /// Directory receiving one output file per repository.
    #[ortho_config(cli_short = 'o')]
    pub output_dir: String,

    /// Directory holding bare mirrors for the local diff strategy.
    #[ortho_config()]
    pub clone_dir: String,

    /// `jsonl` or `json`.
    #[ortho_config(cli_short = 'f')]
    pub output_format: String,

    /// `local` (diff in a mirror) or `remote` (REST file listing).
    #[ortho_config(cli_short = 'd')]
    pub diff_strategy: String,

    /// Worker threads.
    #[ortho_config(cli_short = 'w')]
    pub workers: usize,

    /// Record budget per repository; `0` is unlimited.
    #[ortho_config(cli_short = 'm')]
    pub max_comments_per_repo: usize,

    /// Pull requests created after this ISO-8601 instant are skipped.
    #[ortho_config()]
    pub pr_created_before: String,

    /// Keep threads whose first comment has no diff hunk.
    ///
    /// Booleans are not read from the environment by `ortho_config`.
    #[ortho_config()]
    pub allow_missing_diff_hunk: bool,

    /// API requests admitted per rolling hour across all workers.
    #[ortho_config()]
    pub hourly_request_cap: u32,

    /// Retries after the first attempt of an API call.
    #[ortho_config()]
    pub max_retries: u32,

    /// Fixed backoff between attempts, in milliseconds.
    #[ortho_config()]
    pub retry_delay_ms: u64,

    /// Pull requests per GraphQL page.
    #[ortho_config()]
    pub prs_per_page: u32,

    /// Review threads per GraphQL page.
    #[ortho_config()]
    pub threads_per_page: u32,

    /// Comments per GraphQL page.
    #[ortho_config()]
    pub comments_per_page: u32,

    /// Replacement for the embedded repository-wide query.
    #[ortho_config()]
    pub query_template: Option<String>,

    /// GitHub API base URL.
    #[ortho_config()]
    pub api_base: String,

    /// Base URL mirrors are cloned from.
    #[ortho_config()]
    pub git_base_url: String,

    /// Progress event destination: `log`, `jsonl` (stderr) or `off`.
    #[ortho_config()]
    pub telemetry: String,
}

impl Default for ReviewMineConfig {
    fn default() -> Self {
        let sizes = PageSizes::default();
        Self {
            token: None,
            repos_file: None,
            output_dir: "comments".to_owned(),
            clone_dir: "clones".to_owned(),
            output_format: OutputFormat::default().to_string(),
            diff_strategy: DiffStrategy::default().to_string(),
            workers: 4,
            max_comments_per_repo: 10,
            pr_created_before: "2025-12-01T00:00:00Z".to_owned(),
            allow_missing_diff_hunk: false,
            hourly_request_cap: 5000,
            max_retries: 3,
            retry_delay_ms: 1000,
            prs_per_page: sizes.pull_requests,
            threads_per_page: sizes.threads,
            comments_per_page: sizes.comments,
            query_template: None,
            api_base: "https://api.github.com".to_owned(),
            git_base_url: "https://github.com".to_owned(),
            telemetry: "log".to_owned(),
        }
    }
}

impl ReviewMineConfig {
    /// Resolves the token from configuration or the legacy `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] when no source provides a
    /// non-blank value.
    pub fn resolve_token(&self) -> Result<PersonalAccessToken, ConfigError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .and_then(|value| PersonalAccessToken::new(value).ok())
            .ok_or(ConfigError::MissingToken)
    }

    /// Builds the telemetry sink named by `telemetry`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an unknown sink name.
    pub fn telemetry_sink(&self) -> Result<Box<dyn TelemetrySink>, ConfigError> {
        match self.telemetry.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Box::new(TracingTelemetrySink)),
            "jsonl" => Ok(Box::new(StderrJsonlTelemetrySink)),
            "off" => Ok(Box::new(NoopTelemetrySink)),
            other => Err(invalid(
                "telemetry",
                format!("unknown sink '{other}', expected log, jsonl or off"),
            )),
        }
    }

    /// Validates every value and produces the immutable run settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a missing token, a missing, unreadable
    /// or empty repository list, or any value that fails validation.
    pub fn into_settings(self) -> Result<CollectionSettings, ConfigError> {
        let token = self.resolve_token()?;
        let output_format = self
            .output_format
            .parse::<OutputFormat>()
            .map_err(|message| invalid("output_format", message))?;
        let diff_strategy = self
            .diff_strategy
            .parse::<DiffStrategy>()
            .map_err(|message| invalid("diff_strategy", message))?;
        let limits = self.walk_limits()?;
        let queries = self.queries()?;
        if self.workers == 0 {
            return Err(invalid("workers", "must be at least 1".to_owned()));
        }
        if self.hourly_request_cap == 0 {
            return Err(invalid("hourly_request_cap", "must be at least 1".to_owned()));
        }
        validate_url("api_base", &self.api_base)?;
        let repositories = self.repositories()?;

        Ok(CollectionSettings {
            token,
            repositories,
            output_dir: Utf8PathBuf::from(self.output_dir),
            output_format,
            clone_dir: Utf8PathBuf::from(self.clone_dir),
            diff_strategy,
            workers: self.workers,
            limits,
            hourly_request_cap: self.hourly_request_cap,
            retry: RetryPolicy::new(self.max_retries, Duration::from_millis(self.retry_delay_ms)),
            queries,
            api_base: self.api_base,
            git_base_url: self.git_base_url,
        })
    }

    fn walk_limits(&self) -> Result<WalkLimits, ConfigError> {
        let cutoff = Cutoff::parse(&self.pr_created_before).ok_or_else(|| {
            invalid(
                "pr_created_before",
                format!("'{}' is not an ISO-8601 timestamp", self.pr_created_before),
            )
        })?;
        Ok(WalkLimits {
            max_records: (self.max_comments_per_repo > 0).then_some(self.max_comments_per_repo),
            cutoff,
            require_diff_hunk: !self.allow_missing_diff_hunk,
        })
    }

    fn queries(&self) -> Result<QuerySet, ConfigError> {
        let sizes = PageSizes {
            pull_requests: page_size("prs_per_page", self.prs_per_page)?,
            threads: page_size("threads_per_page", self.threads_per_page)?,
            comments: page_size("comments_per_page", self.comments_per_page)?,
        };
        QuerySet::load(self.query_template.as_deref().map(Path::new), sizes)
            .map_err(|error| invalid("query_template", error.to_string()))
    }

    fn repositories(&self) -> Result<Vec<RepositoryId>, ConfigError> {
        let path = self
            .repos_file
            .as_deref()
            .ok_or(ConfigError::MissingRepositoryList)?;
        let repositories =
            read_repository_list(Path::new(path)).map_err(|error| ConfigError::RepositoryList {
                path: path.to_owned(),
                message: error.to_string(),
            })?;
        if repositories.is_empty() {
            return Err(ConfigError::EmptyRepositoryList {
                path: path.to_owned(),
            });
        }
        Ok(repositories)
    }
}

const fn invalid(field: &'static str, message: String) -> ConfigError {
    ConfigError::Invalid { field, message }
}

fn page_size(field: &'static str, value: u32) -> Result<u32, ConfigError> {
    if (1..=MAX_PAGE_SIZE).contains(&value) {
        Ok(value)
    } else {
        Err(invalid(
            field,
            format!("{value} is outside 1..={MAX_PAGE_SIZE}"),
        ))
    }
}

fn validate_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    url::Url::parse(value)
        .map(drop)
        .map_err(|error| invalid(field, format!("'{value}': {error}")))
}

#[cfg(test)]
mod tests;
