//! Integration tests for the job endpoint family using wiremock.

use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use datto_rmm::auth::ApiToken;
use datto_rmm::client::RmmClient;
use datto_rmm::jobs::*;

fn mock_client(server: &MockServer) -> RmmClient {
    RmmClient::with_base_url(ApiToken::new("mock-token"), &server.uri())
}

#[tokio::test]
async fn fetch_jobs_returns_collection() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("GET"))
        .and(path("/api/v2/account/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "pageDetails": {"nextPageUrl": null},
            "jobs": [
                {"uid": "job-1", "name": "Patch cycle", "status": "active"},
                {"uid": "job-2", "name": "Disk cleanup", "status": "completed"}
            ]
        })))
        .mount(&server)
        .await;

    let jobs = fetch_jobs(&client).await.unwrap();
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].uid, "job-1");
    assert_eq!(jobs[1].status.as_deref(), Some("completed"));
}

#[tokio::test]
async fn get_job_returns_single_job() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("GET"))
        .and(path("/api/v2/job/job-77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "uid": "job-77",
            "name": "Reboot notification",
            "status": "active"
        })))
        .mount(&server)
        .await;

    let job = get_job(&client, "job-77").await.unwrap();
    assert_eq!(job.uid, "job-77");
    assert_eq!(job.status.as_deref(), Some("active"));
}

#[tokio::test]
async fn quick_job_puts_component_and_returns_created_job() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("PUT"))
        .and(path("/api/v2/device/device-9/quickjob"))
        .and(body_json(serde_json::json!({
            "jobName": "Collect logs",
            "jobComponent": {
                "componentUid": "comp-3",
                "variables": [{"name": "depth", "value": "3"}]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "uid": "job-new",
            "name": "Collect logs",
            "status": "active"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = QuickJobRequest {
        job_name: "Collect logs".to_string(),
        job_component: JobComponent {
            component_uid: "comp-3".to_string(),
            variables: vec![JobVariable {
                name: "depth".to_string(),
                value: "3".to_string(),
            }],
        },
    };
    let job = quick_job(&client, "device-9", &request).await.unwrap();
    assert_eq!(job.uid, "job-new");
}
