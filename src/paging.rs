//! Pagination envelope contract and continuation-cursor handling.
//!
//! Datto RMM list endpoints wrap their results in a resource-named array
//! plus a `pageDetails` descriptor:
//!
//! ```json
//! {
//!   "pageDetails": {
//!     "count": 250,
//!     "totalCount": 612,
//!     "prevPageUrl": null,
//!     "nextPageUrl": "https://.../api/v2/account/devices?max=250&page=2"
//!   },
//!   "devices": [ ... ]
//! }
//! ```
//!
//! The array field is named after the resource (`devices`, `sites`,
//! `users`, ...), so each resource module defines its own envelope type
//! and implements [`PagedEnvelope`] to hand the generic fetch loop the
//! items and the continuation cursor.
//!
//! ## Cursor extraction
//!
//! `nextPageUrl` is a full URL. The predecessor tooling derived the next
//! request by splitting that URL on `&` and indexing position 1, which
//! silently breaks if the platform ever reorders its query parameters.
//! [`next_page_path`] instead extracts the `page` parameter by name and
//! applies it to the original resource path — behaviorally identical for
//! today's URLs, robust to reordering.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Result, RmmError};

/// The `pageDetails` descriptor attached to every list response.
///
/// Only `nextPageUrl` drives control flow; the counts are decoded for
/// logging. All fields are optional because the platform omits them on
/// single-page responses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDetails {
    /// Number of items in this page.
    #[serde(default)]
    pub count: Option<u32>,

    /// Total items across all pages, when the platform reports it.
    #[serde(default)]
    pub total_count: Option<u32>,

    /// Full URL of the previous page, if any. Not used by the fetch
    /// loop; decoded for completeness.
    #[serde(default)]
    pub prev_page_url: Option<String>,

    /// Full URL of the next page. `None` (or absent) means this is the
    /// last page and the fetch loop terminates.
    #[serde(default)]
    pub next_page_url: Option<String>,
}

/// Maps a resource-specific list response onto the generic fetch loop.
///
/// Implementors are thin envelope structs (`DevicesPage`, `SitesPage`,
/// ...) whose only job is to name the array field the platform uses for
/// that resource and carry the `pageDetails` descriptor.
pub trait PagedEnvelope: DeserializeOwned {
    /// The item type carried in this envelope's array field.
    type Item;

    /// Consumes the envelope, yielding the page's items (in server
    /// order) and the `nextPageUrl` continuation cursor, if any.
    fn into_page(self) -> (Vec<Self::Item>, Option<String>);
}

/// Extracts the `page` query parameter from a `nextPageUrl` value.
///
/// Accepts both absolute URLs and bare query strings (`?page=2`), since
/// fixtures and proxies sometimes hand back the latter.
fn page_cursor(next_page_url: &str) -> Option<&str> {
    let query = match next_page_url.split_once('?') {
        Some((_, query)) => query,
        None => next_page_url,
    };
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("page="))
        .filter(|value| !value.is_empty())
}

/// Builds the path for the next page of `resource_path` from the
/// server-supplied `next_page_url`.
///
/// Any query parameters the caller put on `resource_path` (e.g. `max`)
/// are preserved; a previous `page` parameter is replaced. Returns
/// [`RmmError::Cursor`] when `next_page_url` carries no `page` parameter,
/// since continuing without a cursor would refetch page 1 forever.
pub(crate) fn next_page_path(resource_path: &str, next_page_url: &str) -> Result<String> {
    let cursor = page_cursor(next_page_url).ok_or_else(|| RmmError::Cursor {
        url: next_page_url.to_string(),
    })?;

    let (base, query) = match resource_path.split_once('?') {
        Some((base, query)) => (base, query),
        None => (resource_path, ""),
    };

    let mut params: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty() && !pair.starts_with("page="))
        .collect();
    let page_param = format!("page={cursor}");
    params.push(&page_param);

    Ok(format!("{base}?{}", params.join("&")))
}
