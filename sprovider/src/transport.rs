//! HTTP transport trait and reqwest-based implementation.
//!
//! A transport performs exactly one request. It reports non-2xx responses as
//! `Ok` with their status so the executor can decide what to do with them;
//! only faults below HTTP (connect, timeout, body read) are `Err`.

use std::time::Duration;

use serde_json::Value;

use crate::{ProviderError, ProviderFuture, RequestConfig, SecretString};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub api_key: SecretString,
    pub body: Option<Value>,
    pub timeout: Duration,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn post(config: &RequestConfig, url: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            api_key: config.api_key.clone(),
            body: Some(body),
            timeout: config.timeout,
            headers: config.headers.clone(),
        }
    }

    pub fn get(config: &RequestConfig, url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            api_key: config.api_key.clone(),
            body: None,
            timeout: config.timeout,
            headers: config.headers.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body; an empty body decodes to `null`.
    pub fn json(&self) -> Result<Value, ProviderError> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&self.body).map_err(|err| {
            ProviderError::decode(format!("response body is not valid JSON: {err}"))
                .with_status(self.status)
                .with_body(self.body.clone())
        })
    }
}

pub trait HttpTransport: Send + Sync + std::fmt::Debug {
    fn send<'a>(&'a self, request: HttpRequest)
    -> ProviderFuture<'a, Result<HttpResponse, ProviderError>>;
}

#[cfg(feature = "reqwest-transport")]
pub use reqwest_impl::ReqwestTransport;

#[cfg(feature = "reqwest-transport")]
mod reqwest_impl {
    use reqwest::Client;

    use super::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
    use crate::{ProviderError, ProviderFuture};

    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        client: Client,
    }

    impl ReqwestTransport {
        pub fn new(client: Client) -> Self {
            Self { client }
        }

        fn map_send_error(err: reqwest::Error) -> ProviderError {
            if err.is_timeout() {
                ProviderError::timeout(err.to_string())
            } else {
                ProviderError::transport(err.to_string())
            }
        }
    }

    impl HttpTransport for ReqwestTransport {
        fn send<'a>(
            &'a self,
            request: HttpRequest,
        ) -> ProviderFuture<'a, Result<HttpResponse, ProviderError>> {
            Box::pin(async move {
                let mut builder = match request.method {
                    HttpMethod::Get => self.client.get(&request.url),
                    HttpMethod::Post => self.client.post(&request.url),
                };

                builder = builder
                    .bearer_auth(request.api_key.expose())
                    .timeout(request.timeout);

                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }

                if let Some(body) = &request.body {
                    builder = builder.json(body);
                }

                let response = builder.send().await.map_err(Self::map_send_error)?;
                let status = response.status().as_u16();
                let body = response.text().await.map_err(Self::map_send_error)?;

                Ok(HttpResponse { status, body })
            })
        }
    }
}
