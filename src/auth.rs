//! OAuth2 password-grant authentication for the Datto RMM platform.
//!
//! The platform exchanges a long-lived API key/secret pair for a
//! short-lived bearer token at `{api_url}/auth/oauth/token`. The request
//! is a form-encoded password grant carrying the API key as the username
//! and the secret as the password, authenticated with the platform's
//! fixed `public-client:public` Basic identity.
//!
//! The token response carries no expiry information, so there is nothing
//! useful to cache against: [`TokenProvider::authenticate`] performs a
//! fresh exchange on every call, and the resulting [`ApiToken`] is
//! treated as valid until the API answers 401
//! ([`RmmError::TokenExpired`](crate::error::RmmError::TokenExpired)).
//!
//! The secret is held in a [`secrecy::SecretString`] and exposed only at
//! the form-encoding boundary; it never appears in logs, `Debug` output,
//! or error messages.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::client::DEFAULT_API_URL;
use crate::error::{Result, RmmError};

/// Connect timeout for the token endpoint. Covers TCP + TLS handshake.
const TOKEN_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall timeout for the token exchange. Token responses are small;
/// 30 seconds is generous.
const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed OAuth client identity the platform expects in the Basic auth
/// header of every token request.
const PUBLIC_CLIENT_ID: &str = "public-client";
const PUBLIC_CLIENT_SECRET: &str = "public";

/// Subset of the token response that we need.
///
/// The endpoint also returns `token_type`, `expires_in`, and `scope`,
/// which are silently ignored: the platform does not honor the advertised
/// expiry, so the only reliable invalidation signal is a 401 from the API.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// An opaque bearer token for the RMM API.
///
/// Obtained from [`TokenProvider::authenticate`] and borrowed by
/// [`RmmClient`](crate::client::RmmClient) for the `Authorization`
/// header. The `Debug` impl redacts the token value so it cannot leak
/// through diagnostic output.
#[derive(Clone)]
pub struct ApiToken(String);

impl ApiToken {
    /// Wraps an already-acquired token string.
    ///
    /// Intended for tests and for callers that obtained a token through
    /// some other channel; normal use goes through
    /// [`TokenProvider::authenticate`].
    pub fn new(raw: impl Into<String>) -> Self {
        ApiToken(raw.into())
    }

    /// The raw token value, as sent in the `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

/// Exchanges API credentials for bearer tokens.
///
/// Stateless with respect to tokens: every [`authenticate`] call issues
/// a fresh exchange. Credentials are supplied once at construction and
/// never logged.
///
/// [`authenticate`]: TokenProvider::authenticate
pub struct TokenProvider {
    client: reqwest::Client,
    api_key: String,
    api_secret: SecretString,
    api_url: String,
}

impl TokenProvider {
    /// Creates a provider against the default platform URL.
    pub fn new(api_key: impl Into<String>, api_secret: SecretString) -> Self {
        Self::with_api_url(api_key, api_secret, DEFAULT_API_URL)
    }

    /// Creates a provider against a specific platform URL.
    ///
    /// Each Datto RMM account lives on a regional platform
    /// (`pinotage-api.centrastage.net`, `zinfandel-api.centrastage.net`,
    /// ...); tests point this at a local mock server instead.
    pub fn with_api_url(
        api_key: impl Into<String>,
        api_secret: SecretString,
        api_url: impl Into<String>,
    ) -> Self {
        TokenProvider {
            client: build_token_client(),
            api_key: api_key.into(),
            api_secret,
            api_url: api_url.into(),
        }
    }

    /// Exchanges the stored credentials for a bearer token.
    ///
    /// The response body is read as text before the status check so that
    /// on failure the platform's error detail is preserved in the
    /// [`RmmError::Auth`] message — `error_for_status()` would discard it.
    ///
    /// # Errors
    ///
    /// [`RmmError::Auth`] on any transport failure, non-2xx response, or
    /// a 2xx body without an `access_token` field. Authentication is not
    /// classified as transient, so no retry happens at this layer. The
    /// error message never contains the API secret.
    pub async fn authenticate(&self) -> Result<ApiToken> {
        let url = format!("{}/auth/oauth/token", self.api_url);
        let form = [
            ("grant_type", "password"),
            ("username", self.api_key.as_str()),
            ("password", self.api_secret.expose_secret()),
        ];

        tracing::debug!(url = %url, "requesting bearer token");

        let response = self
            .client
            .post(&url)
            .basic_auth(PUBLIC_CLIENT_ID, Some(PUBLIC_CLIENT_SECRET))
            .form(&form)
            .send()
            .await
            .map_err(|e| RmmError::Auth {
                message: "token request could not be sent".to_string(),
                source: Some(Box::new(e)),
            })?;

        // Read the body before checking status so the platform's error
        // detail survives into the Auth message.
        let status = response.status();
        let body = response.text().await.map_err(|e| RmmError::Auth {
            message: format!("failed to read token response ({status})"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            tracing::error!(%status, "token request rejected");
            return Err(RmmError::Auth {
                message: format!("token endpoint returned {status}: {body}"),
                source: None,
            });
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| RmmError::Auth {
            message: "token response did not contain an access_token".to_string(),
            source: Some(Box::new(e)),
        })?;

        tracing::debug!("bearer token acquired");
        Ok(ApiToken(token.access_token))
    }
}

/// Builds the HTTP client for token requests.
///
/// Separate from the API client so the two can carry different timeout
/// policies. The TLS floor is 1.2; the platform accepts nothing older.
fn build_token_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(TOKEN_CONNECT_TIMEOUT)
        .timeout(TOKEN_REQUEST_TIMEOUT)
        .min_tls_version(reqwest::tls::Version::TLS_1_2)
        .build()
        .expect("failed to build HTTP client for token endpoint")
}
