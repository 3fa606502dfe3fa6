//! Client wiring: one configuration, one executor, shared by the passthrough
//! endpoints and the thread state machine.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::{
    ApiClient, AssistantRequest, AssistantRunOutcome, ClientConfig, CombinedHooks,
    CompletionOptions, EmbeddingOptions, HttpExecutor, HttpTransport, ImageOptions,
    MetricsObservabilityHooks, ModerationOptions, NoopRequestHooks, NoopThreadRunHooks,
    NoopToolDispatchHooks, ProviderError, RequestHooks, ReqwestTransport, SafeHooks, ThreadClient,
    ThreadError, ThreadRunHooks, ToolDispatchHooks, TracingObservabilityHooks,
};

/// Hooks installed by [`SpindleBuilder::with_observability`].
pub type ObservabilityHooks =
    SafeHooks<CombinedHooks<TracingObservabilityHooks, MetricsObservabilityHooks>>;

#[derive(Clone)]
pub struct Spindle {
    config: Arc<ClientConfig>,
    api: ApiClient,
    threads: ThreadClient,
}

impl Spindle {
    /// Uses the default reqwest transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    pub fn builder(config: ClientConfig) -> SpindleBuilder {
        SpindleBuilder::new(config)
    }

    pub fn config(&self) -> &Arc<ClientConfig> {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Thread primitives for callers driving a run step by step.
    pub fn threads(&self) -> &ThreadClient {
        &self.threads
    }

    /// Resolves a request type name (`completion`, `embedding`, `moderation`,
    /// `images`, `assistant`/`threads`) to its URL.
    pub fn endpoint(&self, request_type: &str) -> Result<String, ProviderError> {
        self.config.endpoints().resolve_name(request_type)
    }

    pub async fn completion(&self, options: CompletionOptions) -> Result<Value, ProviderError> {
        self.api.completion(options).await
    }

    pub async fn embedding(&self, options: EmbeddingOptions) -> Result<Value, ProviderError> {
        self.api.embedding(options).await
    }

    pub async fn moderation(&self, options: ModerationOptions) -> Result<Value, ProviderError> {
        self.api.moderation(options).await
    }

    pub async fn images(&self, options: ImageOptions) -> Result<Value, ProviderError> {
        self.api.images(options).await
    }

    /// Runs an assistant to completion and returns the thread's messages.
    pub async fn assistant(&self, request: AssistantRequest) -> Result<Vec<Value>, ThreadError> {
        self.threads.assistant(request).await
    }

    pub async fn run_assistant(
        &self,
        request: AssistantRequest,
    ) -> Result<AssistantRunOutcome, ThreadError> {
        self.threads.run(request).await
    }
}

impl std::fmt::Debug for Spindle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spindle")
            .field("config", &self.config)
            .field("threads", &self.threads)
            .finish()
    }
}

pub struct SpindleBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn HttpTransport>>,
    request_hooks: Arc<dyn RequestHooks>,
    tool_hooks: Arc<dyn ToolDispatchHooks>,
    thread_hooks: Arc<dyn ThreadRunHooks>,
    transport_backoff: Option<Duration>,
    message_limit: Option<u32>,
}

impl SpindleBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            request_hooks: Arc::new(NoopRequestHooks),
            tool_hooks: Arc::new(NoopToolDispatchHooks),
            thread_hooks: Arc::new(NoopThreadRunHooks),
            transport_backoff: None,
            message_limit: None,
        }
    }

    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Reuses an existing reqwest client (connection pool, proxy settings).
    pub fn http_client(self, client: reqwest::Client) -> Self {
        self.transport(Arc::new(ReqwestTransport::new(client)))
    }

    pub fn request_hooks(mut self, hooks: Arc<dyn RequestHooks>) -> Self {
        self.request_hooks = hooks;
        self
    }

    pub fn tool_hooks(mut self, hooks: Arc<dyn ToolDispatchHooks>) -> Self {
        self.tool_hooks = hooks;
        self
    }

    pub fn thread_hooks(mut self, hooks: Arc<dyn ThreadRunHooks>) -> Self {
        self.thread_hooks = hooks;
        self
    }

    /// Installs tracing and metrics hooks on every layer.
    pub fn with_observability(self) -> Self {
        let hooks: Arc<ObservabilityHooks> = Arc::new(SafeHooks::new(CombinedHooks::new(
            TracingObservabilityHooks,
            MetricsObservabilityHooks,
        )));

        self.request_hooks(hooks.clone())
            .tool_hooks(hooks.clone())
            .thread_hooks(hooks)
    }

    pub fn transport_backoff(mut self, backoff: Duration) -> Self {
        self.transport_backoff = Some(backoff);
        self
    }

    pub fn message_limit(mut self, limit: u32) -> Self {
        self.message_limit = Some(limit);
        self
    }

    pub fn build(self) -> Spindle {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::default()));

        let mut executor = HttpExecutor::new(transport).with_hooks(self.request_hooks);
        if let Some(backoff) = self.transport_backoff {
            executor = executor.with_transport_backoff(backoff);
        }

        let config = Arc::new(self.config);
        let executor = Arc::new(executor);

        let mut threads = ThreadClient::new(Arc::clone(&config), Arc::clone(&executor))
            .with_hooks(self.thread_hooks)
            .with_tool_hooks(self.tool_hooks);
        if let Some(limit) = self.message_limit {
            threads = threads.with_message_limit(limit);
        }

        Spindle {
            api: ApiClient::new(Arc::clone(&config), executor),
            threads,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::{HttpRequest, HttpResponse, ProviderErrorKind, ProviderFuture, user_message};

    #[derive(Debug, Default)]
    struct RecordingTransport {
        urls: Mutex<Vec<String>>,
    }

    impl HttpTransport for RecordingTransport {
        fn send<'a>(
            &'a self,
            request: HttpRequest,
        ) -> ProviderFuture<'a, Result<HttpResponse, ProviderError>> {
            Box::pin(async move {
                self.urls.lock().expect("urls lock").push(request.url);
                Ok(HttpResponse::new(200, json!({"object": "list", "data": []}).to_string()))
            })
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::builder()
            .completion_api_key("sk-facade")
            .base_url("https://api.test/v1")
            .build()
            .expect("config should build")
    }

    #[test]
    fn endpoint_resolves_names_and_rejects_unknown() {
        let client = Spindle::new(config());

        assert_eq!(
            client.endpoint("assistant").expect("assistant"),
            "https://api.test/v1/threads"
        );
        assert_eq!(
            client.endpoint("embedding").expect("embedding"),
            "https://api.test/v1/embeddings"
        );
        let error = client.endpoint("fine_tuning").expect_err("unknown");
        assert_eq!(error.kind, ProviderErrorKind::UnknownRequestType);
    }

    #[tokio::test]
    async fn passthrough_calls_share_the_injected_transport() {
        let transport = Arc::new(RecordingTransport::default());
        let client = Spindle::builder(config())
            .transport(transport.clone())
            .with_observability()
            .build();

        client
            .completion(CompletionOptions::new(vec![user_message("hi")]))
            .await
            .expect("completion");
        client
            .embedding(EmbeddingOptions::new("hello"))
            .await
            .expect("embedding");

        assert_eq!(
            *transport.urls.lock().expect("urls lock"),
            vec![
                "https://api.test/v1/chat/completions",
                "https://api.test/v1/embeddings",
            ]
        );
    }

    #[tokio::test]
    async fn assistant_validation_happens_before_transport() {
        let transport = Arc::new(RecordingTransport::default());
        let client = Spindle::builder(config()).transport(transport.clone()).build();

        let error = client
            .assistant(AssistantRequest::new("asst_1", Vec::new()))
            .await
            .expect_err("empty messages");

        assert_eq!(error.kind, crate::ThreadErrorKind::Validation);
        assert!(transport.urls.lock().expect("urls lock").is_empty());
    }
}
