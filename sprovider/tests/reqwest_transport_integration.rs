#![cfg(feature = "reqwest-transport")]

use std::time::Duration;

use serde_json::json;
use sprovider::{
    ClientConfig, HttpRequest, HttpTransport, RequestKind, RequestOverrides, ReqwestTransport,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn thread_config(server: &MockServer) -> sprovider::RequestConfig {
    ClientConfig::builder()
        .assistant_api_key("sk-wire-123")
        .base_url(format!("{}/v1", server.uri()))
        .timeout(Duration::from_secs(5))
        .build()
        .expect("config should build")
        .request_config(RequestKind::Threads, &RequestOverrides::default())
        .expect("request config")
}

#[tokio::test]
async fn post_sends_bearer_auth_beta_header_and_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/threads"))
        .and(header("authorization", "Bearer sk-wire-123"))
        .and(header("OpenAI-Beta", "assistants=v2"))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "thread_w1"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = thread_config(&server);
    let transport = ReqwestTransport::default();
    let response = transport
        .send(HttpRequest::post(&config, config.url.clone(), json!({})))
        .await
        .expect("request should complete");

    assert_eq!(response.status, 200);
    assert_eq!(response.json().expect("json")["id"], "thread_w1");
}

#[tokio::test]
async fn non_success_status_is_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/threads/thread_w1/runs/run_w1"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"error": {"message": "No run found"}})),
        )
        .mount(&server)
        .await;

    let config = thread_config(&server);
    let url = format!("{}/thread_w1/runs/run_w1", config.url);
    let response = ReqwestTransport::default()
        .send(HttpRequest::get(&config, url))
        .await
        .expect("transport should not fail on 404");

    assert_eq!(response.status, 404);
    assert!(!response.is_success());
    assert!(response.body.contains("No run found"));
}
