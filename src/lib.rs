//! Async Rust client library for the Datto RMM REST API.
//!
//! Provides bearer-token authentication, an authenticated HTTP client
//! with bounded rate-limit retry, a cursor-following pagination driver,
//! and typed wrappers for the device, site, user, job, and
//! software-audit endpoint families.
//!
//! # Modules
//!
//! - [`auth`] — API key/secret to bearer token exchange (password grant).
//! - [`client`] — Authenticated HTTP wrapper and the `fetch_all`
//!   pagination driver.
//! - [`retry`] — Retry policy and HTTP response classification.
//! - [`paging`] — Pagination envelope contract and cursor extraction.
//! - [`error`] — Typed error hierarchy (`RmmError`) for all operations.
//! - [`devices`] — Device listing, lookup, and UDF writes.
//! - [`sites`] — Site listing and site-variable management.
//! - [`users`] — Account user listing.
//! - [`jobs`] — Job listing and quick-job dispatch.
//! - [`audit`] — Software-audit retrieval, single device and fleet-wide.
//!
//! # Quick Start
//!
//! ```ignore
//! use datto_rmm::auth::TokenProvider;
//! use datto_rmm::client::RmmClient;
//! use datto_rmm::devices::fetch_devices;
//! use secrecy::SecretString;
//!
//! let provider = TokenProvider::new("api-key", SecretString::new("api-secret".into()));
//! let token = provider.authenticate().await?;
//! let client = RmmClient::new(token);
//! let devices = fetch_devices(&client).await?;
//! ```
//!
//! Logging goes through the [`tracing`] facade; the library emits events
//! unconditionally and the embedding binary decides where they go by
//! installing a subscriber.

#![warn(missing_docs)]

pub mod audit;
pub mod auth;
pub mod client;
pub mod devices;
pub mod error;
pub mod jobs;
pub mod paging;
pub mod retry;
pub mod sites;
pub mod users;
