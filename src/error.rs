//! Typed error hierarchy for the datto-rmm crate.
//!
//! The upstream tooling this crate replaces signalled failure with the
//! literal string `"Error"`, which forced callers into string comparison.
//! `RmmError` is a structured enum so callers can distinguish failure
//! kinds programmatically:
//!
//! - `Auth` — the credential exchange at `/auth/oauth/token` failed.
//!   Fatal to the operation that requested the token.
//! - `RateLimited` — the platform kept answering 429 (or a secondary
//!   rate-limit 403) until the retry budget was spent.
//! - `TokenExpired` — a 401 arrived mid-fetch. The caller must
//!   re-authenticate and repeat the whole operation; no partial data is
//!   returned.
//! - `NotFound` — 404 on the requested resource. Fan-out callers (fleet
//!   software audits) treat this as a per-device skip; single-resource
//!   callers surface it.
//! - `Api` — any other non-success status. The response body is kept
//!   because the platform's error JSON carries the diagnostic detail.
//! - `Parse` / `Cursor` — the response decoded to something other than
//!   the documented shape.
//! - `Network` — transport-level failure (DNS, TCP, TLS, timeout) with
//!   no HTTP status available.

use reqwest::StatusCode;

/// Unified error type for all datto-rmm library operations.
///
/// Each variant corresponds to a distinct failure boundary. `#[source]`
/// fields enable `Error::source()` chaining so callers and logging
/// frameworks can traverse the full cause chain.
#[derive(Debug, thiserror::Error)]
pub enum RmmError {
    /// Authentication failure at the `/auth/oauth/token` endpoint.
    ///
    /// Covers non-2xx token responses, transport failures reaching the
    /// token endpoint, and a token response missing `access_token`.
    /// The message never contains the API secret.
    #[error("authentication failed: {message}")]
    Auth {
        /// Human-readable description, including HTTP status and the
        /// platform's error body when available.
        message: String,
        /// The underlying transport or parse error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The platform kept rate-limiting the request (429, or 403 with a
    /// rate-limit body marker) until the retry budget was exhausted.
    ///
    /// Transient rate limits below the budget are absorbed internally by
    /// the backoff loop and never surface as errors.
    #[error("rate limited: gave up after {attempts} attempts")]
    RateLimited {
        /// Total requests issued before giving up, including the first.
        attempts: u32,
    },

    /// The platform rejected the bearer token with 401 mid-operation.
    ///
    /// The in-progress fetch is abandoned and any partially accumulated
    /// pages are discarded. The caller must re-authenticate and retry
    /// the whole operation.
    #[error("bearer token rejected (401); re-authenticate and retry the operation")]
    TokenExpired,

    /// The requested resource does not exist (404). Never retried.
    #[error("resource not found: {path}")]
    NotFound {
        /// The API path (relative to `/api`) that returned 404.
        path: String,
    },

    /// The platform returned a non-success status with no special
    /// handling (400, 403 without a rate-limit marker, 5xx, ...).
    ///
    /// The raw body is preserved: Datto RMM error responses carry a JSON
    /// `message` field that is essential for diagnosing permission
    /// problems and malformed requests.
    #[error("API error {status}: {body}")]
    Api {
        /// The HTTP status code returned by the platform.
        status: StatusCode,
        /// The raw response body text, possibly empty.
        body: String,
    },

    /// JSON deserialization failed when parsing an API response body.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A continuation cursor could not be extracted from a
    /// `pageDetails.nextPageUrl` value (no `page` query parameter).
    #[error("unusable continuation cursor: {url}")]
    Cursor {
        /// The `nextPageUrl` value that could not be parsed.
        url: String,
    },

    /// A network-level failure occurred (DNS resolution, TCP connection,
    /// TLS handshake, request timeout, ...). No HTTP status is available
    /// because the request did not complete.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, RmmError>;
