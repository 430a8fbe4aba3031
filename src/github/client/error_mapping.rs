//! Error mapping helpers for the blocking GitHub client.

use reqwest::StatusCode;

use crate::github::error::ApiError;

const MESSAGE_LIMIT: usize = 300;

/// Checks whether a response body indicates a rate limit for the status.
pub(super) fn is_rate_limit_response(status: StatusCode, message: &str) -> bool {
    let is_rate_limit_status = matches!(
        status,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    );

    let lowered = message.to_lowercase();
    let message_indicates_rate_limit =
        lowered.contains("rate limit") || lowered.contains("rate-limit");

    is_rate_limit_status && message_indicates_rate_limit
}

pub(super) fn map_transport_error(operation: &str, error: &reqwest::Error) -> ApiError {
    if error.is_decode() {
        ApiError::Decode {
            message: format!("{operation} failed: {error}"),
        }
    } else {
        ApiError::Network {
            message: format!("{operation} failed: {error}"),
        }
    }
}

pub(super) fn map_http_error(operation: &str, status: StatusCode, body: &str) -> ApiError {
    let message = extract_github_message(body)
        .unwrap_or_else(|| truncate_for_message(body.trim(), MESSAGE_LIMIT));
    if is_rate_limit_response(status, &message) {
        ApiError::RateLimited {
            message: format!("{operation} failed: {message}"),
        }
    } else {
        ApiError::Http {
            status: status.as_u16(),
            message: format!("{operation} failed: {message}"),
        }
    }
}

pub(super) fn extract_github_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return None;
    };
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}

fn truncate_for_message(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_owned();
    }
    let truncated: String = text.chars().take(limit).collect();
    format!("{truncated}...")
}
