//! Device lookup and management for the Datto RMM API.
//!
//! This module covers the device endpoint family:
//!
//! - [`fetch_devices`] — every device on the account, across all pages.
//! - [`fetch_site_devices`] — devices belonging to one site.
//! - [`get_device`] — a single device by its platform UID.
//! - [`set_udf`] — write user-defined fields on a device.
//!
//! The response type [`Device`] captures the properties the platform
//! returns for a managed endpoint. Fields use `Option` where the
//! platform may omit them depending on agent version, audit state, or
//! device class.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::client::RmmClient;
use crate::error::Result;
use crate::paging::{PageDetails, PagedEnvelope};

// ── Response types ─────────────────────────────────────────────────────

/// A managed device as returned by the Datto RMM API.
///
/// Field names use camelCase to match the platform contract exactly.
/// Unknown fields are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Unique platform identifier for this device.
    pub uid: String,

    /// Reported hostname.
    #[serde(default)]
    pub hostname: Option<String>,

    /// UID of the site this device belongs to.
    #[serde(default)]
    pub site_uid: Option<String>,

    /// Display name of the site this device belongs to.
    #[serde(default)]
    pub site_name: Option<String>,

    /// Device class and type reported by the agent
    /// (e.g. category `"device"`, type `"Desktop"`).
    #[serde(default)]
    pub device_type: Option<DeviceType>,

    /// Operating system description string.
    #[serde(default)]
    pub operating_system: Option<String>,

    /// Last internal (LAN) IP address reported by the agent.
    #[serde(default)]
    pub int_ip_address: Option<String>,

    /// Last external (internet-facing) IP address.
    #[serde(default)]
    pub ext_ip_address: Option<String>,

    /// Account of the user last logged in on the device.
    #[serde(default)]
    pub last_logged_in_user: Option<String>,

    /// Epoch milliseconds of the agent's last check-in.
    #[serde(default)]
    pub last_seen: Option<i64>,

    /// Whether the agent currently holds an open connection to the
    /// platform.
    #[serde(default)]
    pub online: Option<bool>,

    /// Whether monitoring for this device is suspended.
    #[serde(default)]
    pub suspended: Option<bool>,

    /// Whether the device has been soft-deleted on the platform.
    #[serde(default)]
    pub deleted: Option<bool>,

    /// Whether the device is flagged as requiring a reboot.
    #[serde(default)]
    pub reboot_required: Option<bool>,

    /// User-defined fields currently set on the device, keyed
    /// `"udf1"`..`"udf30"`. Empty when none are populated.
    #[serde(default)]
    pub udf: BTreeMap<String, String>,
}

/// The class/type pair the platform uses to categorize devices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceType {
    /// Broad category (`"device"`, `"esxihost"`, `"printer"`, ...).
    #[serde(default)]
    pub category: Option<String>,

    /// Specific type within the category (`"Desktop"`, `"Laptop"`,
    /// `"Server"`, ...).
    #[serde(rename = "type", default)]
    pub device_type: Option<String>,
}

/// Pagination envelope for device collections: the platform wraps the
/// rows in a `devices` array next to `pageDetails`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicesPage {
    /// The device rows for this page.
    #[serde(default)]
    pub devices: Vec<Device>,

    /// Pagination descriptor; absent on some single-page responses.
    #[serde(default)]
    pub page_details: Option<PageDetails>,
}

impl PagedEnvelope for DevicesPage {
    type Item = Device;

    fn into_page(self) -> (Vec<Device>, Option<String>) {
        let next = self.page_details.and_then(|details| details.next_page_url);
        (self.devices, next)
    }
}

// ── Request types ──────────────────────────────────────────────────────

/// Request body for the UDF write endpoint.
///
/// The platform accepts a JSON object keyed `"udf1"`..`"udf30"`; only
/// the slots present in the body are written, others are left unchanged.
/// Build one with [`UdfUpdate::slot`]:
///
/// ```
/// use datto_rmm::devices::UdfUpdate;
///
/// let update = UdfUpdate::new()
///     .slot(3, "patch-ring-fast")
///     .slot(12, "owner:help-desk");
/// ```
#[derive(Debug, Default, Clone, Serialize)]
pub struct UdfUpdate(BTreeMap<String, String>);

impl UdfUpdate {
    /// Creates an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets UDF slot `n` (1..=30) to `value`.
    pub fn slot(mut self, n: u8, value: impl Into<String>) -> Self {
        self.0.insert(format!("udf{n}"), value.into());
        self
    }

    /// Whether any slots have been set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ── Endpoint functions ─────────────────────────────────────────────────

/// Retrieves every device on the account, following pagination until the
/// platform reports no further pages.
///
/// # Errors
///
/// Standard fetch taxonomy: [`RateLimited`] after the retry budget,
/// [`TokenExpired`] on 401 (no partial result), [`Api`]/[`Network`]/
/// [`Parse`] otherwise.
///
/// [`RateLimited`]: crate::error::RmmError::RateLimited
/// [`TokenExpired`]: crate::error::RmmError::TokenExpired
/// [`Api`]: crate::error::RmmError::Api
/// [`Network`]: crate::error::RmmError::Network
/// [`Parse`]: crate::error::RmmError::Parse
pub async fn fetch_devices(client: &RmmClient) -> Result<Vec<Device>> {
    client.fetch_all::<DevicesPage>("/v2/account/devices").await
}

/// Retrieves every device belonging to one site, across all pages.
pub async fn fetch_site_devices(client: &RmmClient, site_uid: &str) -> Result<Vec<Device>> {
    let path = format!("/v2/site/{site_uid}/devices");
    client.fetch_all::<DevicesPage>(&path).await
}

/// Retrieves a single device by its platform UID.
///
/// A 404 maps to [`RmmError::NotFound`](crate::error::RmmError::NotFound).
pub async fn get_device(client: &RmmClient, device_uid: &str) -> Result<Device> {
    let path = format!("/v2/device/{device_uid}");
    client.get(&path).await
}

/// Writes user-defined fields on a device.
///
/// Slots not named in `update` are left unchanged. The platform answers
/// with an empty 200 on success, so there is nothing to return.
pub async fn set_udf(client: &RmmClient, device_uid: &str, update: &UdfUpdate) -> Result<()> {
    let path = format!("/v2/device/{device_uid}/udf");
    client.post_unit(&path, update).await
}
