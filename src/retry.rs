//! Retry policy and HTTP response classification for the RMM API.
//!
//! Every request the client sends runs through the same classification:
//!
//! - 2xx — success, decode the body.
//! - 429 — platform rate limit: back off for a fixed delay and retry.
//! - 403 *with a rate-limit marker in the body* — the platform's
//!   secondary (application-level) rate limit, handled like 429. A 403
//!   without the marker is a genuine permissions failure and is fatal:
//!   retrying a permissions error forever only hides it.
//! - 401 — the bearer token was rejected. Terminal; the caller must
//!   re-authenticate.
//! - 404 — the resource does not exist. Terminal, never retried.
//! - anything else — fatal API error.
//!
//! Backoff is a fixed delay, not exponential: the platform's rate-limit
//! window resets on a fixed schedule, so waiting longer each time buys
//! nothing. The retry budget is bounded ([`RetryPolicy::max_attempts`],
//! default 10) so a sustained 429 storm surfaces as
//! [`RateLimited`](crate::error::RmmError::RateLimited) instead of
//! blocking the caller forever.

use reqwest::StatusCode;
use std::time::Duration;

/// Default maximum number of requests (first attempt included) before a
/// sustained rate limit is surfaced as an error.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default pause between rate-limited attempts. Matches the platform's
/// documented rate-limit window.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(60);

/// Bounds the rate-limit retry loop.
///
/// Defaults:
/// - `max_attempts`: 10. Generous enough to ride out a transient 429
///   burst, small enough that a misconfigured account fails within
///   minutes rather than hanging indefinitely.
/// - `backoff`: 60 seconds. The platform rejects requests for the
///   remainder of its rate-limit window; a fixed pause of one window is
///   the documented recovery interval.
///
/// Tests shrink `backoff` to milliseconds via [`RetryPolicy::new`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum total requests per logical call, including the first.
    pub max_attempts: u32,
    /// Fixed pause between rate-limited attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget and backoff delay.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        RetryPolicy {
            max_attempts,
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }
}

/// What the request loop should do with one HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Disposition {
    /// 2xx — hand the body to the caller.
    Success,
    /// Rate limited — sleep the fixed backoff and reissue the request.
    Backoff,
    /// 401 — terminal; the token is no longer valid.
    AuthExpired,
    /// 404 — terminal; the resource does not exist.
    NotFound,
    /// Any other non-success status — terminal API error.
    Fatal,
}

/// Classifies one response into a [`Disposition`].
///
/// The body is consulted only for 403: the platform reuses that status
/// for both its secondary rate limit and genuine authorization failures,
/// distinguishable only by the body text.
pub(crate) fn classify(status: StatusCode, body: &str) -> Disposition {
    if status.is_success() {
        return Disposition::Success;
    }
    match status {
        StatusCode::TOO_MANY_REQUESTS => Disposition::Backoff,
        StatusCode::FORBIDDEN if is_secondary_rate_limit(body) => Disposition::Backoff,
        StatusCode::UNAUTHORIZED => Disposition::AuthExpired,
        StatusCode::NOT_FOUND => Disposition::NotFound,
        _ => Disposition::Fatal,
    }
}

/// Returns `true` if a 403 body identifies the platform's secondary
/// rate limit rather than a permissions failure.
fn is_secondary_rate_limit(body: &str) -> bool {
    let body = body.to_ascii_lowercase();
    body.contains("rate limit") || body.contains("too many requests")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_default_has_sane_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.backoff, Duration::from_secs(60));
    }

    #[test]
    fn policy_new_uses_provided_values() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, Duration::from_millis(10));
    }

    #[test]
    fn success_statuses_classify_as_success() {
        for status in [StatusCode::OK, StatusCode::CREATED, StatusCode::NO_CONTENT] {
            assert_eq!(classify(status, ""), Disposition::Success);
        }
    }

    #[test]
    fn too_many_requests_classifies_as_backoff() {
        assert_eq!(
            classify(StatusCode::TOO_MANY_REQUESTS, ""),
            Disposition::Backoff
        );
    }

    #[test]
    fn forbidden_with_rate_limit_marker_classifies_as_backoff() {
        assert_eq!(
            classify(
                StatusCode::FORBIDDEN,
                r#"{"message":"Rate limit exceeded, try again later"}"#
            ),
            Disposition::Backoff
        );
        // Marker matching is case-insensitive.
        assert_eq!(
            classify(StatusCode::FORBIDDEN, "TOO MANY REQUESTS from this key"),
            Disposition::Backoff
        );
    }

    #[test]
    fn forbidden_without_marker_is_fatal() {
        // A plain 403 is a permissions failure; retrying it forever would
        // only mask the misconfiguration.
        assert_eq!(
            classify(
                StatusCode::FORBIDDEN,
                r#"{"message":"Insufficient security level"}"#
            ),
            Disposition::Fatal
        );
    }

    #[test]
    fn unauthorized_classifies_as_auth_expired() {
        assert_eq!(
            classify(StatusCode::UNAUTHORIZED, ""),
            Disposition::AuthExpired
        );
    }

    #[test]
    fn not_found_classifies_as_not_found() {
        assert_eq!(classify(StatusCode::NOT_FOUND, ""), Disposition::NotFound);
    }

    #[test]
    fn other_errors_are_fatal() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            assert_eq!(classify(status, ""), Disposition::Fatal, "{status}");
        }
    }
}
