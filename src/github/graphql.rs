//! GraphQL response envelopes and error classification.
//!
//! GitHub reports GraphQL failures inside a 200 response. Three classes
//! matter to the collector:
//!
//! - **resource limits** (`RESOURCE_LIMITS_EXCEEDED`): the page is partial,
//!   some nodes are `null`, but the remaining data is usable;
//! - **rate limiting** (`RATE_LIMITED` or a "rate limit" message): transient,
//!   retried by the client;
//! - **everything else** (schema, query, permission errors): fatal.

use serde::Deserialize;

use super::error::ApiError;

/// Top-level GraphQL response body.
#[derive(Debug, Deserialize)]
pub struct GraphQlEnvelope<T> {
    /// Query result; absent or `null` when the query failed outright.
    pub data: Option<T>,
    /// Errors reported alongside (or instead of) the data.
    #[serde(default)]
    pub errors: Vec<GraphQlErrorEntry>,
}

/// One entry of the `errors` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GraphQlErrorEntry {
    /// GitHub's error type, e.g. `RESOURCE_LIMITS_EXCEEDED`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Response path the error applies to.
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
}

/// How a GraphQL error affects the request that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Partial data; continue with the nodes that resolved.
    ResourceLimit,
    /// Quota exhaustion; retry after backoff.
    RateLimited,
    /// Query, schema or permission failure; do not retry.
    Fatal,
}

/// Classifies a single GraphQL error entry.
#[must_use]
pub fn classify(entry: &GraphQlErrorEntry) -> ErrorClass {
    match entry.kind.as_deref() {
        Some("RESOURCE_LIMITS_EXCEEDED") => ErrorClass::ResourceLimit,
        Some("RATE_LIMITED") => ErrorClass::RateLimited,
        _ if entry.message.to_lowercase().contains("rate limit") => ErrorClass::RateLimited,
        _ => ErrorClass::Fatal,
    }
}

fn describe(entries: &[&GraphQlErrorEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let path: Vec<String> = entry.path.iter().map(ToString::to_string).collect();
            if path.is_empty() {
                entry.message.clone()
            } else {
                format!("{} (path: {})", entry.message, path.join("."))
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Turns an envelope into its data, applying the error classes.
///
/// # Errors
///
/// - [`ApiError::GraphQl`] when any fatal error is present;
/// - [`ApiError::RateLimited`] when the only blocking errors are rate limits;
/// - [`ApiError::Decode`] when no data accompanies resource-limit errors.
pub fn interpret<T>(envelope: GraphQlEnvelope<T>) -> Result<T, ApiError> {
    let GraphQlEnvelope { data, errors } = envelope;

    let fatal: Vec<&GraphQlErrorEntry> = errors
        .iter()
        .filter(|entry| classify(entry) == ErrorClass::Fatal)
        .collect();
    if !fatal.is_empty() {
        return Err(ApiError::GraphQl {
            message: describe(&fatal),
        });
    }

    let rate_limited: Vec<&GraphQlErrorEntry> = errors
        .iter()
        .filter(|entry| classify(entry) == ErrorClass::RateLimited)
        .collect();
    if !rate_limited.is_empty() {
        return Err(ApiError::RateLimited {
            message: describe(&rate_limited),
        });
    }

    if !errors.is_empty() {
        let partial: Vec<&GraphQlErrorEntry> = errors.iter().collect();
        tracing::warn!(
            errors = errors.len(),
            "resource limits exceeded; continuing with partial data: {}",
            describe(&partial)
        );
    }

    data.ok_or_else(|| ApiError::Decode {
        message: "GraphQL response carried no data".to_owned(),
    })
}
