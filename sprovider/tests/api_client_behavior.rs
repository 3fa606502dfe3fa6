use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use sprovider::{
    ApiClient, ClientConfig, CompletionOptions, EmbeddingOptions, HttpExecutor, HttpRequest,
    HttpResponse, HttpTransport, ImageOptions, Message, ModerationOptions, ProviderError,
    ProviderErrorKind, ProviderFuture, RequestOverrides, ToolDefinition,
};

#[derive(Debug, Default)]
struct EchoTransport {
    requests: Mutex<Vec<HttpRequest>>,
}

impl HttpTransport for EchoTransport {
    fn send<'a>(
        &'a self,
        request: HttpRequest,
    ) -> ProviderFuture<'a, Result<HttpResponse, ProviderError>> {
        Box::pin(async move {
            let body = json!({"url": request.url, "echo": request.body}).to_string();
            self.requests.lock().expect("requests lock").push(request);
            Ok(HttpResponse::new(200, body))
        })
    }
}

fn client(config: ClientConfig) -> (ApiClient, Arc<EchoTransport>) {
    let transport = Arc::new(EchoTransport::default());
    let executor = Arc::new(HttpExecutor::new(transport.clone()));
    (ApiClient::new(Arc::new(config), executor), transport)
}

fn configured() -> ClientConfig {
    ClientConfig::builder()
        .completion_api_key("sk-api-123")
        .base_url("http://localhost:4010/v1")
        .temperature(0.4)
        .max_tokens(512)
        .build()
        .expect("config should build")
}

#[tokio::test]
async fn completion_merges_defaults_and_overrides_into_payload() {
    let (client, transport) = client(configured());
    let options = CompletionOptions::new(vec![
        Message::system("be brief"),
        Message::user("hello"),
    ])
    .with_tools(vec![ToolDefinition::new(
        "lookup",
        "Look up an id",
        json!({"type": "object"}),
    )])
    .with_overrides(RequestOverrides::default().with_model("gpt-4o").with_top_p(0.9));

    let response = client.completion(options).await.expect("completion");

    assert_eq!(response["url"], "http://localhost:4010/v1/chat/completions");
    let payload = &response["echo"];
    assert_eq!(payload["model"], "gpt-4o");
    assert_eq!(payload["max_tokens"], 512);
    assert!(payload["temperature"].as_f64().is_some());
    assert!(payload["top_p"].as_f64().is_some());
    assert_eq!(payload["messages"][0], json!({"role": "system", "content": "be brief"}));
    assert_eq!(payload["tools"][0]["function"]["name"], "lookup");

    let requests = transport.requests.lock().expect("requests lock");
    assert!(requests[0].headers.is_empty());
}

#[tokio::test]
async fn completion_validation_fails_before_any_request() {
    let (client, transport) = client(configured());

    let error = client
        .completion(CompletionOptions::new(Vec::new()))
        .await
        .expect_err("empty messages");
    assert_eq!(error.kind, ProviderErrorKind::Validation);

    let error = client
        .completion(CompletionOptions::new(vec![Message::user("")]))
        .await
        .expect_err("empty content");
    assert_eq!(error.kind, ProviderErrorKind::Validation);

    assert!(transport.requests.lock().expect("requests lock").is_empty());
}

#[tokio::test]
async fn missing_api_key_fails_before_any_request() {
    let config = ClientConfig::builder().build().expect("config should build");
    let (client, transport) = client(config);

    let error = client
        .completion(CompletionOptions::new(vec![Message::user("hi")]))
        .await
        .expect_err("no key");

    assert_eq!(error.kind, ProviderErrorKind::Configuration);
    assert!(transport.requests.lock().expect("requests lock").is_empty());
}

#[tokio::test]
async fn embedding_moderation_and_images_hit_their_endpoints() {
    let (client, _transport) = client(configured());

    let embedding = client
        .embedding(EmbeddingOptions::new(json!(["alpha", "beta"])))
        .await
        .expect("embedding");
    assert_eq!(embedding["url"], "http://localhost:4010/v1/embeddings");
    assert_eq!(embedding["echo"]["model"], "text-embedding-3-small");

    let moderation = client
        .moderation(ModerationOptions::new("some text").with_model("omni-moderation-latest"))
        .await
        .expect("moderation");
    assert_eq!(moderation["url"], "http://localhost:4010/v1/moderations");
    assert_eq!(moderation["echo"]["model"], "omni-moderation-latest");

    let images = client
        .images(ImageOptions::new("a lighthouse").with_count(2).with_size("512x512"))
        .await
        .expect("images");
    assert_eq!(images["url"], "http://localhost:4010/v1/images/generations");
    assert_eq!(images["echo"]["n"], 2);
    assert_eq!(images["echo"]["model"], Value::Null);
}

#[tokio::test]
async fn empty_inputs_are_rejected() {
    let (client, _transport) = client(configured());

    let error = client
        .embedding(EmbeddingOptions::new(""))
        .await
        .expect_err("empty input");
    assert_eq!(error.kind, ProviderErrorKind::Validation);

    let error = client
        .images(ImageOptions::new("  "))
        .await
        .expect_err("empty prompt");
    assert_eq!(error.kind, ProviderErrorKind::Validation);
}
