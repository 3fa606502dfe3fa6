//! Bearer-authenticated JSON request executor with bounded retry.
//!
//! Every call path (passthrough endpoints and the thread state machine)
//! funnels through [`HttpExecutor`]. One call makes at most
//! `RequestConfig::retries` attempts and returns the first 2xx body decoded
//! as JSON, or the last failure as a typed error.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::{
    HttpRequest, HttpTransport, NoopRequestHooks, ProviderError, RequestConfig, RequestHooks,
    RetryPolicy, execute_with_retry,
};

#[derive(Clone)]
pub struct HttpExecutor {
    transport: Arc<dyn HttpTransport>,
    hooks: Arc<dyn RequestHooks>,
    transport_backoff: Duration,
}

impl HttpExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            hooks: Arc::new(NoopRequestHooks),
            transport_backoff: RetryPolicy::default().transport_backoff,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn RequestHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_transport_backoff(mut self, backoff: Duration) -> Self {
        self.transport_backoff = backoff;
        self
    }

    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(&self.transport)
    }

    /// POSTs `payload` as JSON to `url`.
    pub async fn send(
        &self,
        operation: &str,
        config: &RequestConfig,
        url: &str,
        payload: Value,
    ) -> Result<Value, ProviderError> {
        let request = HttpRequest::post(config, url, payload);
        self.execute(operation, request, config.retries).await
    }

    pub async fn get(
        &self,
        operation: &str,
        config: &RequestConfig,
        url: &str,
    ) -> Result<Value, ProviderError> {
        let request = HttpRequest::get(config, url);
        self.execute(operation, request, config.retries).await
    }

    pub async fn execute(
        &self,
        operation: &str,
        request: HttpRequest,
        retries: u32,
    ) -> Result<Value, ProviderError> {
        let policy = RetryPolicy::new(retries).with_transport_backoff(self.transport_backoff);
        let url = request.url.clone();

        execute_with_retry(
            operation,
            &url,
            &policy,
            self.hooks.as_ref(),
            |_attempt| {
                let request = request.clone();
                async move {
                    let response = self.transport.send(request).await?;
                    if !response.is_success() {
                        return Err(ProviderError::from_status(response.status, response.body));
                    }

                    response.json()
                }
            },
            tokio::time::sleep,
        )
        .await
    }
}

impl std::fmt::Debug for HttpExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpExecutor")
            .field("transport", &self.transport)
            .field("transport_backoff", &self.transport_backoff)
            .finish()
    }
}
