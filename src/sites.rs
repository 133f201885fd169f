//! Site lookup and site-variable management for the Datto RMM API.
//!
//! This module covers the site endpoint family:
//!
//! - [`fetch_sites`] — every site on the account, across all pages.
//! - [`fetch_site_variables`] — the variables defined on one site.
//! - [`create_site_variable`] / [`update_site_variable`] — mutations.
//!
//! Site variables are name/value pairs injected into component jobs at
//! run time; a variable can be masked so its value is hidden in the
//! platform UI (the API still returns masked values as `null`).

use serde::{Deserialize, Serialize};

use crate::client::RmmClient;
use crate::error::Result;
use crate::paging::{PageDetails, PagedEnvelope};

// ── Response types ─────────────────────────────────────────────────────

/// A site (customer/location grouping of devices) as returned by the
/// platform. Field names use camelCase to match the API contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Unique platform identifier for this site.
    pub uid: String,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,

    /// Free-text operator notes.
    #[serde(default)]
    pub notes: Option<String>,

    /// Whether this is the account's On Demand (agentless) site.
    #[serde(default)]
    pub on_demand: Option<bool>,

    /// Number of devices currently assigned to the site, when the
    /// platform reports it.
    #[serde(default)]
    pub devices_count: Option<u32>,
}

/// A site variable as returned by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteVariable {
    /// Numeric identifier, used to address the variable in updates.
    #[serde(default)]
    pub id: Option<i64>,

    /// Variable name as referenced by components.
    pub name: String,

    /// Variable value. `None` when the variable is masked — the platform
    /// never echoes masked values back.
    #[serde(default)]
    pub value: Option<String>,

    /// Whether the value is hidden in the platform UI.
    #[serde(default)]
    pub masked: Option<bool>,
}

/// Pagination envelope for site collections (`sites` array).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitesPage {
    /// The site rows for this page.
    #[serde(default)]
    pub sites: Vec<Site>,

    /// Pagination descriptor; absent on some single-page responses.
    #[serde(default)]
    pub page_details: Option<PageDetails>,
}

impl PagedEnvelope for SitesPage {
    type Item = Site;

    fn into_page(self) -> (Vec<Site>, Option<String>) {
        let next = self.page_details.and_then(|details| details.next_page_url);
        (self.sites, next)
    }
}

/// Pagination envelope for site-variable collections (`variables` array).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteVariablesPage {
    /// The variable rows for this page.
    #[serde(default)]
    pub variables: Vec<SiteVariable>,

    /// Pagination descriptor; absent on some single-page responses.
    #[serde(default)]
    pub page_details: Option<PageDetails>,
}

impl PagedEnvelope for SiteVariablesPage {
    type Item = SiteVariable;

    fn into_page(self) -> (Vec<SiteVariable>, Option<String>) {
        let next = self.page_details.and_then(|details| details.next_page_url);
        (self.variables, next)
    }
}

// ── Request types ──────────────────────────────────────────────────────

/// Request body for creating or updating a site variable.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteVariableRequest {
    /// Variable name as referenced by components.
    pub name: String,

    /// Variable value.
    pub value: String,

    /// Whether to hide the value in the platform UI. Omitted when
    /// `None`, leaving the platform default (unmasked) or the existing
    /// setting in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked: Option<bool>,
}

// ── Endpoint functions ─────────────────────────────────────────────────

/// Retrieves every site on the account, following pagination until the
/// platform reports no further pages.
pub async fn fetch_sites(client: &RmmClient) -> Result<Vec<Site>> {
    client.fetch_all::<SitesPage>("/v2/account/sites").await
}

/// Retrieves a single site by its platform UID.
pub async fn get_site(client: &RmmClient, site_uid: &str) -> Result<Site> {
    let path = format!("/v2/site/{site_uid}");
    client.get(&path).await
}

/// Retrieves every variable defined on one site, across all pages.
pub async fn fetch_site_variables(client: &RmmClient, site_uid: &str) -> Result<Vec<SiteVariable>> {
    let path = format!("/v2/site/{site_uid}/variables");
    client.fetch_all::<SiteVariablesPage>(&path).await
}

/// Creates a variable on a site, returning the stored variable
/// (including its platform-assigned `id`).
pub async fn create_site_variable(
    client: &RmmClient,
    site_uid: &str,
    variable: &SiteVariableRequest,
) -> Result<SiteVariable> {
    let path = format!("/v2/site/{site_uid}/variable");
    client.put(&path, variable).await
}

/// Updates an existing site variable by its numeric id, returning the
/// stored variable.
pub async fn update_site_variable(
    client: &RmmClient,
    site_uid: &str,
    variable_id: i64,
    variable: &SiteVariableRequest,
) -> Result<SiteVariable> {
    let path = format!("/v2/site/{site_uid}/variable/{variable_id}");
    client.post(&path, variable).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_deserializes_full_response() {
        let json = r#"{
            "uid": "site-abc",
            "name": "Head Office",
            "description": "Primary location",
            "notes": "Contact reception before visits",
            "onDemand": false,
            "devicesCount": 42
        }"#;
        let site: Site = serde_json::from_str(json).unwrap();
        assert_eq!(site.uid, "site-abc");
        assert_eq!(site.name.as_deref(), Some("Head Office"));
        assert_eq!(site.on_demand, Some(false));
        assert_eq!(site.devices_count, Some(42));
    }

    #[test]
    fn site_deserializes_minimal_response() {
        let site: Site = serde_json::from_str(r#"{"uid": "bare"}"#).unwrap();
        assert_eq!(site.uid, "bare");
        assert!(site.name.is_none());
    }

    #[test]
    fn masked_variable_has_no_value() {
        // The platform returns null for masked values; decoding must not
        // fail on it.
        let json = r#"{"id": 7, "name": "ADMIN_PASSWORD", "value": null, "masked": true}"#;
        let var: SiteVariable = serde_json::from_str(json).unwrap();
        assert_eq!(var.name, "ADMIN_PASSWORD");
        assert!(var.value.is_none());
        assert_eq!(var.masked, Some(true));
    }

    #[test]
    fn sites_page_splits_items_and_cursor() {
        let json = r#"{
            "pageDetails": {"nextPageUrl": "https://api.example.net/api/v2/account/sites?max=250&page=2"},
            "sites": [{"uid": "s-1"}, {"uid": "s-2"}]
        }"#;
        let page: SitesPage = serde_json::from_str(json).unwrap();
        let (items, next) = page.into_page();
        assert_eq!(items.len(), 2);
        assert!(next.unwrap().contains("page=2"));
    }

    #[test]
    fn variables_page_without_cursor_is_terminal() {
        let json = r#"{
            "pageDetails": {"count": 1, "nextPageUrl": null},
            "variables": [{"id": 1, "name": "KEY", "value": "v"}]
        }"#;
        let page: SiteVariablesPage = serde_json::from_str(json).unwrap();
        let (items, next) = page.into_page();
        assert_eq!(items.len(), 1);
        assert!(next.is_none());
    }

    #[test]
    fn variable_request_omits_masked_when_unset() {
        let req = SiteVariableRequest {
            name: "DEPLOY_KEY".to_string(),
            value: "abc".to_string(),
            masked: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["name"], "DEPLOY_KEY");
        assert!(
            json.get("masked").is_none(),
            "None masked should be omitted from JSON"
        );
    }

    #[test]
    fn variable_request_serializes_masked_flag() {
        let req = SiteVariableRequest {
            name: "SECRET".to_string(),
            value: "s".to_string(),
            masked: Some(true),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["masked"], true);
    }
}
