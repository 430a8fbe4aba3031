//! Shared request quota and GitHub rate limit headers.
//!
//! [`RateLimiter`] is the process-wide gate every outbound API call passes
//! through. It is constructed once and shared by reference-counted handle
//! with every client, so all worker threads draw from the same hourly quota.
//! [`RateLimitInfo`] captures the `X-RateLimit-*` headers GitHub returns so
//! the limiter can pause when the server reports an exhausted quota.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use reqwest::header::HeaderMap;

/// Limiter key shared by every GitHub API call.
pub const GITHUB_API_KEY: &str = "github_api";

const HOUR: Duration = Duration::from_secs(3600);
const FALLBACK_SLEEP: Duration = Duration::from_secs(1);

/// Rate limit information extracted from GitHub API response headers.
///
/// GitHub includes rate limit headers (`X-RateLimit-Limit`, `X-RateLimit-Remaining`,
/// `X-RateLimit-Reset`) in API responses. This struct captures those values for
/// inspection by callers.
///
/// # Example
///
/// ```
/// use reviewmine::github::rate_limit::RateLimitInfo;
///
/// let info = RateLimitInfo::new(5000, 4999, 1700000000);
/// assert!(!info.is_exhausted());
/// assert_eq!(info.remaining(), 4999);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Maximum requests allowed in the current window.
    limit: u32,
    /// Remaining requests in the current window.
    remaining: u32,
    /// Unix timestamp when the rate limit resets.
    reset_at: u64,
}

impl RateLimitInfo {
    /// Creates a new rate limit info instance.
    #[must_use]
    pub const fn new(limit: u32, remaining: u32, reset_at: u64) -> Self {
        Self {
            limit,
            remaining,
            reset_at,
        }
    }

    /// Reads the `X-RateLimit-*` headers from a response.
    ///
    /// Returns `None` when any of the three headers is absent or malformed.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let read = |name: &str| -> Option<u64> {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse().ok())
        };
        let limit = u32::try_from(read("x-ratelimit-limit")?).ok()?;
        let remaining = u32::try_from(read("x-ratelimit-remaining")?).ok()?;
        let reset_at = read("x-ratelimit-reset")?;
        Some(Self::new(limit, remaining, reset_at))
    }

    /// Returns the maximum requests allowed in the current window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the remaining requests in the current window.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Returns the Unix timestamp when the rate limit resets.
    #[must_use]
    pub const fn reset_at(&self) -> u64 {
        self.reset_at
    }

    /// Returns true if the rate limit has been exhausted.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Calculates seconds until the rate limit resets.
    ///
    /// Returns 0 if the reset time has already passed or if the system time
    /// cannot be determined.
    #[must_use]
    pub fn seconds_until_reset(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs())
            .unwrap_or(0);

        self.reset_at.saturating_sub(now)
    }
}

/// Result of a non-blocking quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// One unit of quota was consumed.
    Admitted,
    /// The quota is spent; retry after the given delay when it is known.
    Wait(Option<Duration>),
}

#[derive(Debug, Default)]
struct KeyState {
    admitted_at: VecDeque<Instant>,
    paused_until: Option<Instant>,
}

/// Rolling-window request gate shared by every worker thread.
///
/// Admission times are kept per key; a call is admitted only when fewer than
/// `cap` admissions happened within the trailing window. The check and the
/// record happen under one lock so concurrent callers cannot over-admit.
#[derive(Debug)]
pub struct RateLimiter {
    cap: u32,
    window: Duration,
    fallback_sleep: Duration,
    keys: Mutex<HashMap<String, KeyState>>,
}

impl RateLimiter {
    /// Creates a limiter admitting `cap` calls per rolling hour.
    #[must_use]
    pub fn hourly(cap: u32) -> Self {
        Self::with_window(cap, HOUR)
    }

    /// Creates a limiter with an arbitrary window length.
    #[must_use]
    pub fn with_window(cap: u32, window: Duration) -> Self {
        Self {
            cap,
            window,
            fallback_sleep: FALLBACK_SLEEP,
            keys: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, KeyState>> {
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Consumes one unit for `key` if the window allows it.
    #[must_use]
    pub fn try_consume(&self, key: &str) -> Admission {
        let now = Instant::now();
        let mut keys = self.lock();
        let state = keys.entry(key.to_owned()).or_default();

        if let Some(paused_until) = state.paused_until {
            if paused_until > now {
                return Admission::Wait(Some(paused_until.duration_since(now)));
            }
            state.paused_until = None;
        }

        while state
            .admitted_at
            .front()
            .is_some_and(|oldest| now.duration_since(*oldest) >= self.window)
        {
            state.admitted_at.pop_front();
        }

        let in_window = u32::try_from(state.admitted_at.len()).unwrap_or(u32::MAX);
        if in_window < self.cap {
            state.admitted_at.push_back(now);
            return Admission::Admitted;
        }

        let next_free = state
            .admitted_at
            .front()
            .and_then(|oldest| oldest.checked_add(self.window))
            .and_then(|free_at| free_at.checked_duration_since(now));
        Admission::Wait(next_free)
    }

    /// Blocks until one unit of quota is available for `key`, then consumes
    /// it.
    ///
    /// Never fails; when the reset time cannot be determined the caller
    /// sleeps for the short fallback interval and checks again.
    pub fn wait_and_consume(&self, key: &str) {
        loop {
            match self.try_consume(key) {
                Admission::Admitted => return,
                Admission::Wait(Some(delay)) => {
                    tracing::debug!(key, ?delay, "waiting for API quota");
                    thread::sleep(delay);
                }
                Admission::Wait(None) => thread::sleep(self.fallback_sleep),
            }
        }
    }

    /// Pauses `key` until the server-reported reset when the quota is spent.
    pub fn observe(&self, key: &str, info: &RateLimitInfo) {
        if !info.is_exhausted() {
            return;
        }
        let reset_in = Duration::from_secs(info.seconds_until_reset());
        let Some(paused_until) = Instant::now().checked_add(reset_in) else {
            return;
        };
        tracing::warn!(
            key,
            limit = info.limit(),
            reset_at = info.reset_at(),
            reset_in_secs = reset_in.as_secs(),
            "GitHub reports an exhausted quota; pausing requests"
        );
        let mut keys = self.lock();
        let state = keys.entry(key.to_owned()).or_default();
        state.paused_until = Some(state.paused_until.map_or(paused_until, |current| {
            current.max(paused_until)
        }));
    }
}
