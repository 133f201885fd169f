//! Integration tests for the site endpoint family using wiremock.
//!
//! Covers site listing, site-variable listing across pages, and the
//! create/update variable mutations.

use wiremock::matchers::{body_json, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use datto_rmm::auth::ApiToken;
use datto_rmm::client::RmmClient;
use datto_rmm::sites::*;

fn mock_client(server: &MockServer) -> RmmClient {
    RmmClient::with_base_url(ApiToken::new("mock-token"), &server.uri())
}

#[tokio::test]
async fn fetch_sites_returns_decoded_rows() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("GET"))
        .and(path("/api/v2/account/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "pageDetails": {"nextPageUrl": null},
            "sites": [
                {"uid": "site-1", "name": "Head Office", "devicesCount": 42},
                {"uid": "site-2", "name": "Warehouse", "onDemand": false}
            ]
        })))
        .mount(&server)
        .await;

    let sites = fetch_sites(&client).await.unwrap();
    assert_eq!(sites.len(), 2);
    assert_eq!(sites[0].name.as_deref(), Some("Head Office"));
    assert_eq!(sites[0].devices_count, Some(42));
    assert_eq!(sites[1].uid, "site-2");
}

#[tokio::test]
async fn fetch_site_variables_follows_pagination() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("GET"))
        .and(path("/api/v2/site/site-1/variables"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "pageDetails": {
                "nextPageUrl": format!("{}/api/v2/site/site-1/variables?max=250&page=2", server.uri())
            },
            "variables": [{"id": 1, "name": "DEPLOY_KEY", "value": "k1"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/site/site-1/variables"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "pageDetails": {"nextPageUrl": null},
            "variables": [{"id": 2, "name": "ADMIN_PASSWORD", "value": null, "masked": true}]
        })))
        .mount(&server)
        .await;

    let variables = fetch_site_variables(&client, "site-1").await.unwrap();
    assert_eq!(variables.len(), 2);
    assert_eq!(variables[0].name, "DEPLOY_KEY");
    assert_eq!(variables[1].name, "ADMIN_PASSWORD");
    assert!(
        variables[1].value.is_none(),
        "masked values are never echoed back"
    );
}

#[tokio::test]
async fn create_site_variable_puts_and_returns_stored_variable() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("PUT"))
        .and(path("/api/v2/site/site-1/variable"))
        .and(body_json(serde_json::json!({
            "name": "DEPLOY_KEY",
            "value": "abc123",
            "masked": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 17,
            "name": "DEPLOY_KEY",
            "value": null,
            "masked": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = SiteVariableRequest {
        name: "DEPLOY_KEY".to_string(),
        value: "abc123".to_string(),
        masked: Some(true),
    };
    let variable = create_site_variable(&client, "site-1", &request)
        .await
        .unwrap();
    assert_eq!(variable.id, Some(17));
    assert_eq!(variable.masked, Some(true));
}

#[tokio::test]
async fn update_site_variable_posts_to_the_variable_id() {
    let server = MockServer::start().await;
    let client = mock_client(&server);

    Mock::given(method("POST"))
        .and(path("/api/v2/site/site-1/variable/17"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 17,
            "name": "DEPLOY_KEY",
            "value": "rotated",
            "masked": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = SiteVariableRequest {
        name: "DEPLOY_KEY".to_string(),
        value: "rotated".to_string(),
        masked: None,
    };
    let variable = update_site_variable(&client, "site-1", 17, &request)
        .await
        .unwrap();
    assert_eq!(variable.value.as_deref(), Some("rotated"));
}
