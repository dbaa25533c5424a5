//! Transport and client-variant integration tests.
//!
//! These run against a wiremock HTTP server standing in for Logseq's API
//! server; no real Logseq instance is required.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use logseq_bridge::logseq::{DbGraphClient, FileGraphClient, HttpTransport};
use logseq_bridge::response::classify;
use logseq_bridge::{connect, ApiError, BridgeConfig, GraphFlavor, LogseqApi};

fn transport(server: &MockServer) -> HttpTransport {
    HttpTransport::new(&server.uri(), "secret-token", Duration::from_secs(2)).unwrap()
}

fn config(server: &MockServer) -> BridgeConfig {
    BridgeConfig {
        host: server.uri(),
        token: "secret-token".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_call_posts_method_body_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .and(header("Authorization", "Bearer secret-token"))
        .and(body_partial_json(json!({
            "method": "logseq.App.getCurrentGraph",
            "args": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "demo",
            "path": "/graphs/demo"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = FileGraphClient::new(transport(&server));
    let graph = client.get_current_graph().await.unwrap();
    assert_eq!(graph.name, "demo");
    assert_eq!(graph.path, "/graphs/demo");
}

#[tokio::test]
async fn test_unauthorized_surfaces_as_token_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = FileGraphClient::new(transport(&server));
    let err = client.get_current_graph().await.unwrap_err();
    assert!(matches!(err, ApiError::TokenNotCorrect));

    let envelope: logseq_bridge::StructuredResponse<()> = classify(err);
    assert_eq!(envelope.status, 401);
    assert!(envelope.msg.contains("token"));
}

#[tokio::test]
async fn test_unreachable_server_surfaces_as_connect_error() {
    // Port 1 — nothing listening.
    let transport =
        HttpTransport::new("http://127.0.0.1:1", "t", Duration::from_millis(200)).unwrap();
    let client = FileGraphClient::new(transport);
    let err = client.get_current_graph().await.unwrap_err();
    assert!(matches!(err, ApiError::Connect { .. }));

    let envelope: logseq_bridge::StructuredResponse<()> = classify(err);
    assert_eq!(envelope.status, 500);
    assert!(envelope.msg.contains("connect"));
}

#[tokio::test]
async fn test_connect_selects_db_variant_from_probe() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_partial_json(json!({
            "method": "logseq.App.checkCurrentIsDbGraph"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
        .mount(&server)
        .await;

    let api = connect(&config(&server)).await.unwrap();
    assert_eq!(api.flavor(), GraphFlavor::Db);
}

#[tokio::test]
async fn test_connect_selects_file_variant_from_probe() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(false)))
        .mount(&server)
        .await;

    let api = connect(&config(&server)).await.unwrap();
    assert_eq!(api.flavor(), GraphFlavor::File);
}

#[tokio::test]
async fn test_connect_treats_unknown_probe_method_as_file_graph() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "Not existed method logseq.App.checkCurrentIsDbGraph"
        })))
        .mount(&server)
        .await;

    let api = connect(&config(&server)).await.unwrap();
    assert_eq!(api.flavor(), GraphFlavor::File);
}

#[tokio::test]
async fn test_missing_search_method_surfaces_as_version_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "Not existed method logseq.App.search"
        })))
        .mount(&server)
        .await;

    let client = FileGraphClient::new(transport(&server));
    let err = client.search("anything").await.unwrap_err();
    assert!(matches!(err, ApiError::IncompatibleVersion));
}

#[tokio::test]
async fn test_search_with_empty_payload_is_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "blocks": [],
            "pages": []
        })))
        .mount(&server)
        .await;

    let client = FileGraphClient::new(transport(&server));
    let err = client.search("anything").await.unwrap_err();
    assert!(matches!(err, ApiError::EmptyResult));
}

#[tokio::test]
async fn test_db_client_unwraps_nested_page_identity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .and(body_partial_json(json!({"method": "logseq.Editor.getPage"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": {"id": 7, "name": "projects", "originalName": "Projects"}
        })))
        .mount(&server)
        .await;

    let client = DbGraphClient::new(transport(&server));
    let page = client
        .get_page(&"projects".into())
        .await
        .unwrap()
        .expect("page should resolve");
    assert_eq!(page.id, Some(7));
    assert_eq!(page.display_name(), Some("Projects"));
}

#[tokio::test]
async fn test_missing_entities_come_back_as_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .mount(&server)
        .await;

    let client = FileGraphClient::new(transport(&server));
    assert!(client.get_page(&"ghost".into()).await.unwrap().is_none());
    let uuid = uuid::Uuid::new_v4();
    assert!(client.get_block(&uuid, false).await.unwrap().is_none());
}
