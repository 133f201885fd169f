//! Job listing and quick-job dispatch for the Datto RMM API.
//!
//! A "quick job" runs a single component against one device immediately,
//! outside any schedule. Dispatching one is a single PUT; the platform
//! answers with the created [`Job`], whose `uid` can then be polled via
//! [`get_job`] if the caller wants completion status.

use serde::{Deserialize, Serialize};

use crate::client::RmmClient;
use crate::error::Result;
use crate::paging::{PageDetails, PagedEnvelope};

// ── Response types ─────────────────────────────────────────────────────

/// A job as returned by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Unique platform identifier for this job.
    pub uid: String,

    /// Job display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Lifecycle status string (`"active"`, `"completed"`, ...). Left
    /// as text: the platform's status vocabulary is not stable across
    /// versions.
    #[serde(default)]
    pub status: Option<String>,
}

/// Pagination envelope for job collections (`jobs` array).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobsPage {
    /// The job rows for this page.
    #[serde(default)]
    pub jobs: Vec<Job>,

    /// Pagination descriptor; absent on some single-page responses.
    #[serde(default)]
    pub page_details: Option<PageDetails>,
}

impl PagedEnvelope for JobsPage {
    type Item = Job;

    fn into_page(self) -> (Vec<Job>, Option<String>) {
        let next = self.page_details.and_then(|details| details.next_page_url);
        (self.jobs, next)
    }
}

// ── Request types ──────────────────────────────────────────────────────

/// Request body for the quick-job endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickJobRequest {
    /// Display name given to the dispatched job.
    pub job_name: String,

    /// The component to run and its input variables.
    pub job_component: JobComponent,
}

/// The component reference inside a [`QuickJobRequest`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobComponent {
    /// UID of the component to execute (from the account's component
    /// library).
    pub component_uid: String,

    /// Input variables handed to the component. Omitted entirely when
    /// empty.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub variables: Vec<JobVariable>,
}

/// One name/value input variable for a component run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobVariable {
    /// Variable name, as declared by the component.
    pub name: String,

    /// Variable value.
    pub value: String,
}

// ── Endpoint functions ─────────────────────────────────────────────────

/// Retrieves the account's jobs, across all pages.
pub async fn fetch_jobs(client: &RmmClient) -> Result<Vec<Job>> {
    client.fetch_all::<JobsPage>("/v2/account/jobs").await
}

/// Retrieves a single job by its platform UID.
pub async fn get_job(client: &RmmClient, job_uid: &str) -> Result<Job> {
    let path = format!("/v2/job/{job_uid}");
    client.get(&path).await
}

/// Dispatches a quick job against one device, returning the created job.
pub async fn quick_job(
    client: &RmmClient,
    device_uid: &str,
    request: &QuickJobRequest,
) -> Result<Job> {
    let path = format!("/v2/device/{device_uid}/quickjob");
    client.put(&path, request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_deserializes_platform_shape() {
        let json = r#"{"uid": "job-123", "name": "Disk cleanup", "status": "active"}"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.uid, "job-123");
        assert_eq!(job.status.as_deref(), Some("active"));
    }

    #[test]
    fn jobs_page_splits_items_and_cursor() {
        let json = r#"{
            "pageDetails": {"nextPageUrl": "?page=2"},
            "jobs": [{"uid": "j-1"}]
        }"#;
        let page: JobsPage = serde_json::from_str(json).unwrap();
        let (items, next) = page.into_page();
        assert_eq!(items.len(), 1);
        assert_eq!(next.as_deref(), Some("?page=2"));
    }

    #[test]
    fn quick_job_request_serializes_component_and_variables() {
        let req = QuickJobRequest {
            job_name: "Reboot notification".to_string(),
            job_component: JobComponent {
                component_uid: "comp-789".to_string(),
                variables: vec![JobVariable {
                    name: "message".to_string(),
                    value: "Maintenance at 22:00".to_string(),
                }],
            },
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["jobName"], "Reboot notification");
        assert_eq!(json["jobComponent"]["componentUid"], "comp-789");
        assert_eq!(json["jobComponent"]["variables"][0]["name"], "message");
    }

    #[test]
    fn quick_job_request_omits_empty_variables() {
        let req = QuickJobRequest {
            job_name: "No-input run".to_string(),
            job_component: JobComponent {
                component_uid: "comp-1".to_string(),
                variables: Vec::new(),
            },
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(
            json["jobComponent"].get("variables").is_none(),
            "empty variables should be omitted from the body"
        );
    }
}
