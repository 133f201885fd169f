//! Software-audit retrieval for the Datto RMM API.
//!
//! The audit endpoints expose what the agent's last inventory pass found
//! on a device. This module covers the software inventory:
//!
//! - [`fetch_device_software`] — the installed-software records for one
//!   device, across all pages.
//! - [`fetch_fleet_software`] — the same, fanned out over a list of
//!   device UIDs.
//!
//! The fan-out treats a 404 on one device as a skip, not a failure:
//! audit data lags device enrollment, so a freshly-onboarded or deleted
//! device routinely has no audit rows while the rest of the fleet does.
//! Any other error aborts the fan-out.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client::RmmClient;
use crate::error::{Result, RmmError};
use crate::paging::{PageDetails, PagedEnvelope};

/// One installed-software record from a device's audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareRecord {
    /// Product name as reported by the device.
    pub name: String,

    /// Product version string, when the device reports one.
    #[serde(default)]
    pub version: Option<String>,
}

/// Pagination envelope for software-audit collections (`software`
/// array).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwarePage {
    /// The software rows for this page.
    #[serde(default)]
    pub software: Vec<SoftwareRecord>,

    /// Pagination descriptor; absent on some single-page responses.
    #[serde(default)]
    pub page_details: Option<PageDetails>,
}

impl PagedEnvelope for SoftwarePage {
    type Item = SoftwareRecord;

    fn into_page(self) -> (Vec<SoftwareRecord>, Option<String>) {
        let next = self.page_details.and_then(|details| details.next_page_url);
        (self.software, next)
    }
}

/// Retrieves the installed-software audit for one device, across all
/// pages.
///
/// A 404 maps to [`RmmError::NotFound`]; callers auditing many devices
/// should prefer [`fetch_fleet_software`], which downgrades that case to
/// a logged skip.
pub async fn fetch_device_software(
    client: &RmmClient,
    device_uid: &str,
) -> Result<Vec<SoftwareRecord>> {
    let path = format!("/v2/audit/device/{device_uid}/software");
    client.fetch_all::<SoftwarePage>(&path).await
}

/// Retrieves software audits for a list of devices.
///
/// Devices are fetched sequentially in the order given; the result pairs
/// each audited device UID with its records. A device whose audit
/// returns 404 is logged and skipped — it simply does not appear in the
/// result. Every other error aborts the whole fan-out, since a rate
/// limit or expired token on one device will equally affect the rest.
pub async fn fetch_fleet_software(
    client: &RmmClient,
    device_uids: &[String],
) -> Result<Vec<(String, Vec<SoftwareRecord>)>> {
    let mut audits = Vec::with_capacity(device_uids.len());

    for uid in device_uids {
        match fetch_device_software(client, uid).await {
            Ok(records) => audits.push((uid.clone(), records)),
            Err(RmmError::NotFound { .. }) => {
                warn!(device_uid = %uid, "no audit data for device; skipping");
            }
            Err(other) => return Err(other),
        }
    }

    Ok(audits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn software_record_deserializes_platform_shape() {
        let json = r#"{"name": "7-Zip 23.01 (x64)", "version": "23.01"}"#;
        let record: SoftwareRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "7-Zip 23.01 (x64)");
        assert_eq!(record.version.as_deref(), Some("23.01"));
    }

    #[test]
    fn software_record_tolerates_missing_version() {
        // Drivers and store apps frequently report no version string.
        let record: SoftwareRecord =
            serde_json::from_str(r#"{"name": "Some Driver Package"}"#).unwrap();
        assert!(record.version.is_none());
    }

    #[test]
    fn software_page_splits_items_and_cursor() {
        let json = r#"{
            "pageDetails": {
                "count": 2,
                "nextPageUrl": "https://api.example.net/api/v2/audit/device/d-1/software?max=2&page=2"
            },
            "software": [
                {"name": "App A", "version": "1.0"},
                {"name": "App B"}
            ]
        }"#;
        let page: SoftwarePage = serde_json::from_str(json).unwrap();
        let (items, next) = page.into_page();
        assert_eq!(items.len(), 2);
        assert!(next.unwrap().contains("page=2"));
    }
}
