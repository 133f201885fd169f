//! Authenticated HTTP client for the Datto RMM REST API.
//!
//! `RmmClient` wraps a `reqwest::Client`, the platform base URL, and a
//! borrowed-per-construction [`ApiToken`], providing JSON request
//! helpers (`get`, `post`, `put`) and the paginated collection driver
//! [`fetch_all`](RmmClient::fetch_all).
//!
//! Every request runs through the same classification loop
//! (see [`retry`](crate::retry)):
//!
//! - Rate limits (429, or 403 with a rate-limit body marker) are
//!   absorbed by sleeping a fixed backoff and reissuing the request, up
//!   to the [`RetryPolicy`] attempt budget.
//! - 401 aborts immediately with
//!   [`RmmError::TokenExpired`](crate::error::RmmError::TokenExpired);
//!   the client never refreshes tokens itself because the platform's
//!   tokens carry no usable expiry — re-authentication is the caller's
//!   decision.
//! - 404 maps to [`RmmError::NotFound`](crate::error::RmmError::NotFound)
//!   so fan-out callers can skip missing devices without string-matching.
//! - Everything else is a terminal error carrying the response body.
//!
//! Pagination is strictly sequential within one collection: each page's
//! cursor is only known after the previous response is decoded.

use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::auth::ApiToken;
use crate::error::{Result, RmmError};
use crate::paging::{next_page_path, PagedEnvelope};
use crate::retry::{classify, Disposition, RetryPolicy};

/// Default platform endpoint. Datto RMM accounts are homed on regional
/// platforms; override with [`RmmClient::with_base_url`] (or the
/// `--api-url` CLI flag) when the account lives elsewhere.
pub const DEFAULT_API_URL: &str = "https://zinfandel-api.centrastage.net";

/// Connect timeout for API calls. Covers TCP + TLS handshake only.
const API_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall request timeout for API calls, response body included.
/// Collection pages max out at 250 rows of modest JSON; one minute is
/// ample headroom for a slow platform.
const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Builds the `reqwest::Client` used for API calls.
///
/// Separate from the token client so the two can carry different
/// timeout policies. The TLS floor is 1.2.
fn build_api_client() -> Client {
    Client::builder()
        .connect_timeout(API_CONNECT_TIMEOUT)
        .timeout(API_REQUEST_TIMEOUT)
        .min_tls_version(reqwest::tls::Version::TLS_1_2)
        .build()
        .expect("failed to build HTTP client for RMM API")
}

/// Authenticated client for the Datto RMM REST API.
///
/// Holds the bearer token for its lifetime but never mutates or
/// refreshes it; when the platform answers 401 the caller is told to
/// re-authenticate and build a new client. `base_url` is a `String`
/// rather than a constant so tests can point at a wiremock server.
pub struct RmmClient {
    client: Client,
    base_url: String,
    token: ApiToken,
    retry: RetryPolicy,
}

impl RmmClient {
    /// Creates a client against the default platform URL with the
    /// default retry policy.
    pub fn new(token: ApiToken) -> Self {
        Self::with_base_url(token, DEFAULT_API_URL)
    }

    /// Creates a client against a specific platform URL, used by tests
    /// to point at a local mock server and by accounts homed on other
    /// regional platforms.
    pub fn with_base_url(token: ApiToken, base_url: &str) -> Self {
        RmmClient {
            client: build_api_client(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy. Tests shrink the backoff to
    /// milliseconds; callers with strict latency budgets shrink the
    /// attempt count.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Core request loop: sends one authenticated request, classifies
    /// the response, and either returns the success body, backs off and
    /// reissues, or maps the outcome to a typed error.
    ///
    /// All public helpers delegate here, so mutations get the same
    /// rate-limit handling as paginated reads. `path` is relative to
    /// `{base_url}/api` and should start with `/`.
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String> {
        let url = format!("{}/api{}", self.base_url, path);
        let mut attempt: u32 = 1;

        loop {
            let mut request = self
                .client
                .request(method.clone(), &url)
                .bearer_auth(self.token.as_str());
            if let Some(payload) = body {
                request = request.json(payload);
            }

            let response = request.send().await?;
            let status = response.status();
            // The body is read before classification: 403 disambiguation
            // and fatal-error reporting both need the text.
            let text = response.text().await?;

            match classify(status, &text) {
                Disposition::Success => {
                    debug!(%status, bytes = text.len(), %url, "request succeeded");
                    return Ok(text);
                }
                Disposition::Backoff => {
                    if attempt >= self.retry.max_attempts {
                        error!(%status, attempt, %url, "rate limit retry budget exhausted");
                        return Err(RmmError::RateLimited { attempts: attempt });
                    }
                    warn!(
                        %status,
                        attempt,
                        backoff_secs = self.retry.backoff.as_secs_f64(),
                        %url,
                        "rate limited; backing off before retry"
                    );
                    tokio::time::sleep(self.retry.backoff).await;
                    attempt += 1;
                }
                Disposition::AuthExpired => {
                    error!(%url, "bearer token rejected (401)");
                    return Err(RmmError::TokenExpired);
                }
                Disposition::NotFound => {
                    debug!(%url, "resource not found (404)");
                    return Err(RmmError::NotFound {
                        path: path.to_string(),
                    });
                }
                Disposition::Fatal => {
                    error!(%status, %url, "API request failed");
                    return Err(RmmError::Api { status, body: text });
                }
            }
        }
    }

    /// Sends an authenticated GET and deserializes the JSON response.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.execute::<()>(Method::GET, path, None).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Sends an authenticated POST with a JSON body and deserializes
    /// the response.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let text = self.execute(Method::POST, path, Some(body)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Sends an authenticated POST whose success response carries no
    /// JSON body (the platform answers some mutations, e.g. UDF writes,
    /// with an empty 200).
    pub async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.execute(Method::POST, path, Some(body)).await?;
        Ok(())
    }

    /// Sends an authenticated PUT with a JSON body and deserializes
    /// the response.
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let text = self.execute(Method::PUT, path, Some(body)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Fetches a complete paginated collection, following
    /// `pageDetails.nextPageUrl` until the platform stops supplying one.
    ///
    /// Page order is preserved: page N's items precede page N+1's, and
    /// each page keeps its server-delivered order. No deduplication is
    /// performed — if the collection mutates between page requests the
    /// platform may deliver an item twice, and that is passed through.
    ///
    /// A 401 on any page abandons the fetch and discards pages already
    /// accumulated; partial collections are never returned.
    ///
    /// The envelope type `P` names the resource's array field; see
    /// [`PagedEnvelope`].
    pub async fn fetch_all<P: PagedEnvelope>(&self, path: &str) -> Result<Vec<P::Item>> {
        let mut items = Vec::new();
        let mut current = path.to_string();
        let mut pages: u32 = 0;

        loop {
            let body = self.execute::<()>(Method::GET, &current, None).await?;
            let envelope: P = serde_json::from_str(&body)?;
            let (page_items, next) = envelope.into_page();
            pages += 1;
            debug!(
                page = pages,
                rows = page_items.len(),
                path = %current,
                "page fetched"
            );
            items.extend(page_items);

            match next {
                Some(next_url) => current = next_page_path(path, &next_url)?,
                None => break,
            }
        }

        debug!(total = items.len(), pages, path, "collection fetched");
        Ok(items)
    }
}
