//! Blocking GitHub client shared by every worker thread.
//!
//! Each request waits on the shared [`RateLimiter`] before it is sent and is
//! retried with a fixed backoff while the failure is transient. Retries run
//! in an explicit bounded loop; the bound comes from [`RetryPolicy`].

use std::sync::Arc;
use std::thread;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::error::ApiError;
use super::graphql::{GraphQlEnvelope, interpret};
use super::locator::PersonalAccessToken;
use super::rate_limit::{GITHUB_API_KEY, RateLimitInfo, RateLimiter};
use super::retry::RetryPolicy;

mod error_mapping;

use error_mapping::{map_http_error, map_transport_error};

const USER_AGENT: &str = concat!("reviewmine/", env!("CARGO_PKG_VERSION"));
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Authenticated GitHub API client for GraphQL and REST calls.
///
/// Cloning is cheap; clones share the HTTP connection pool and the rate
/// limiter.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    token: PersonalAccessToken,
    api_base: String,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl GitHubClient {
    /// Creates a client for the given token and API base URL.
    ///
    /// # Arguments
    ///
    /// * `token` - Personal access token sent as a bearer credential.
    /// * `api_base` - Base URL for the GitHub API (e.g. `https://api.github.com`).
    /// * `limiter` - Quota gate shared with every other client in the process.
    /// * `retry` - Bound and delay for transient failures.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] when `api_base` is not a URL and
    /// [`ApiError::Network`] when the HTTP client cannot be constructed.
    pub fn new(
        token: PersonalAccessToken,
        api_base: &str,
        limiter: Arc<RateLimiter>,
        retry: RetryPolicy,
    ) -> Result<Self, ApiError> {
        url::Url::parse(api_base).map_err(|error| ApiError::InvalidUrl {
            message: format!("{api_base}: {error}"),
        })?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| ApiError::Network {
                message: format!("failed to configure HTTP client: {error}"),
            })?;
        Ok(Self {
            http,
            token,
            api_base: api_base.trim_end_matches('/').to_owned(),
            limiter,
            retry,
        })
    }

    /// Returns the limiter this client consults.
    #[must_use]
    pub const fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Sends one GraphQL query and returns its decoded `data`.
    ///
    /// Resource-limit errors yield the partial data; callers must skip `null`
    /// nodes.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::GraphQl`] for fatal GraphQL errors without
    /// retrying, any other non-transient [`ApiError`] as soon as it occurs,
    /// and [`ApiError::RetriesExhausted`] once the retry bound is reached.
    pub fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: &serde_json::Value,
    ) -> Result<T, ApiError> {
        let endpoint = format!("{}/graphql", self.api_base);
        let payload = json!({ "query": query, "variables": variables });
        self.with_retry("graphql", || {
            let response = self.send(self.http.post(&endpoint).json(&payload), "graphql")?;
            let envelope: GraphQlEnvelope<T> = response
                .json()
                .map_err(|error| map_transport_error("graphql", &error))?;
            interpret(envelope)
        })
    }

    /// Sends one REST `GET` request to `path` relative to the API base.
    ///
    /// # Errors
    ///
    /// Same policy as [`GitHubClient::graphql`], minus the GraphQL classes.
    pub fn rest_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let endpoint = format!("{}/{}", self.api_base, path.trim_start_matches('/'));
        self.with_retry(path, || {
            let response = self.send(self.http.get(&endpoint).query(params), path)?;
            response
                .json()
                .map_err(|error| map_transport_error(path, &error))
        })
    }

    fn send(&self, request: RequestBuilder, operation: &str) -> Result<Response, ApiError> {
        self.limiter.wait_and_consume(GITHUB_API_KEY);

        let response = request
            .bearer_auth(self.token.value())
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .send()
            .map_err(|error| map_transport_error(operation, &error))?;

        if let Some(info) = RateLimitInfo::from_headers(response.headers()) {
            self.limiter.observe(GITHUB_API_KEY, &info);
        }

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        Err(map_http_error(operation, status, &body))
    }

    fn with_retry<T>(
        &self,
        operation: &str,
        mut call: impl FnMut() -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 0_u32;
        loop {
            attempt = attempt.saturating_add(1);
            match call() {
                Ok(value) => return Ok(value),
                Err(error) if error.is_transient() => {
                    if attempt >= max_attempts {
                        return Err(ApiError::RetriesExhausted {
                            attempts: attempt,
                            last: Box::new(error),
                        });
                    }
                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts,
                        "transient GitHub failure, retrying: {error}"
                    );
                    thread::sleep(self.retry.delay());
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests;
