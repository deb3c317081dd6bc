//! E2E tests for health check and basic server functionality

mod common;

use common::TestServer;

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(&server.url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_cors_headers() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(&server.url("/health"))
        .header("Origin", "https://dashboard.example.com")
        .send()
        .await
        .unwrap();

    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn test_404_for_unknown_routes() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(&server.url("/unknown/route"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_metrics_endpoint_is_served() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(&server.url("/metrics"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_reference_districts_are_seeded() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(&server.url("/api/districts"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    let districts = body["data"].as_array().unwrap();
    assert_eq!(districts.len(), 20);
    let pune = districts
        .iter()
        .find(|d| d["districtId"] == "pune")
        .expect("pune is seeded");
    assert_eq!(pune["state"], "Maharashtra");
    assert_eq!(pune["latitude"], 18.5204);
}
