//! Pull request creation cutoff.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parses an ISO-8601 timestamp.
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00Z`, with any offset), a naive
/// date-time taken as UTC, or a bare date taken as midnight UTC.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Upper bound on pull request creation time.
///
/// A pull request is skipped only when its creation time parses and is
/// strictly later than the cutoff. Missing or unparseable timestamps are
/// admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cutoff(DateTime<Utc>);

impl Cutoff {
    /// Creates a cutoff at `instant`.
    #[must_use]
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Parses a cutoff with [`parse_timestamp`].
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        parse_timestamp(value).map(Self)
    }

    /// Returns true when a pull request created at `created_at` is walked.
    #[must_use]
    pub fn admits(&self, created_at: Option<&str>) -> bool {
        created_at
            .and_then(parse_timestamp)
            .is_none_or(|created| created <= self.0)
    }
}

impl fmt::Display for Cutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
