//! Client-wide configuration and the per-call `RequestConfig` merged from it.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use sprovider::{ClientConfig, RequestKind, RequestOverrides};
//!
//! let config = ClientConfig::builder()
//!     .completion_api_key("sk-test")
//!     .retries(2)
//!     .timeout(Duration::from_secs(10))
//!     .temperature(0.2)
//!     .build()
//!     .expect("config should build");
//!
//! let request = config
//!     .request_config(RequestKind::Completion, &RequestOverrides::default().with_model("gpt-4o"))
//!     .expect("key is configured");
//!
//! assert_eq!(request.model, "gpt-4o");
//! assert_eq!(request.temperature, Some(0.2));
//! assert_eq!(request.retries, 2);
//! ```

use std::sync::Arc;
use std::time::Duration;

use scommon::SamplingOptions;

use crate::{CredentialStore, EndpointResolver, KeyScope, ProviderError, RequestKind, SecretString};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const BETA_HEADER_NAME: &str = "OpenAI-Beta";
pub const BETA_HEADER_VALUE: &str = "assistants=v2";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    credentials: Arc<CredentialStore>,
    endpoints: EndpointResolver,
    pub retries: u32,
    pub timeout: Duration,
    pub defaults: SamplingOptions,
    pub beta_header: Option<(String, String)>,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Reads `OPENAI_API_KEY`, `OPENAI_ASSISTANT_API_KEY`, `OPENAI_BASE_URL`,
    /// `SPINDLE_RETRIES` and `SPINDLE_TIMEOUT_SECS` from the process environment.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(key) = lookup("OPENAI_API_KEY") {
            builder = builder.completion_api_key(key);
        }

        if let Some(key) = lookup("OPENAI_ASSISTANT_API_KEY") {
            builder = builder.assistant_api_key(key);
        }

        if let Some(base_url) = lookup("OPENAI_BASE_URL") {
            builder = builder.base_url(base_url);
        }

        if let Some(raw) = lookup("SPINDLE_RETRIES") {
            let retries = raw.trim().parse::<u32>().map_err(|err| {
                ProviderError::configuration(format!("SPINDLE_RETRIES is not a number: {err}"))
            })?;
            builder = builder.retries(retries);
        }

        if let Some(raw) = lookup("SPINDLE_TIMEOUT_SECS") {
            let seconds = raw.trim().parse::<u64>().map_err(|err| {
                ProviderError::configuration(format!(
                    "SPINDLE_TIMEOUT_SECS is not a number: {err}"
                ))
            })?;
            builder = builder.timeout(Duration::from_secs(seconds));
        }

        builder.build()
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn endpoints(&self) -> &EndpointResolver {
        &self.endpoints
    }

    /// Builds the immutable configuration for one call. Fails with a
    /// configuration error when no key is available for the call's scope.
    pub fn request_config(
        &self,
        kind: RequestKind,
        overrides: &RequestOverrides,
    ) -> Result<RequestConfig, ProviderError> {
        let api_key = match &overrides.api_key {
            Some(key) if !key.trim().is_empty() => SecretString::new(key.clone()),
            _ => self.credentials.resolve(kind.key_scope())?,
        };

        let sampling = self.defaults.merged_with(&overrides.sampling);
        let headers = match (&self.beta_header, kind) {
            (Some(header), RequestKind::Threads) => vec![header.clone()],
            _ => Vec::new(),
        };

        Ok(RequestConfig {
            kind,
            url: self.endpoints.resolve(kind),
            api_key,
            model: sampling.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
            top_p: sampling.top_p,
            retries: overrides.retries.unwrap_or(self.retries).max(1),
            timeout: overrides.timeout.unwrap_or(self.timeout),
            headers,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    completion_api_key: Option<String>,
    assistant_api_key: Option<String>,
    endpoints: EndpointResolver,
    retries: u32,
    timeout: Duration,
    defaults: SamplingOptions,
    beta_header: Option<(String, String)>,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            completion_api_key: None,
            assistant_api_key: None,
            endpoints: EndpointResolver::default(),
            retries: DEFAULT_RETRIES,
            timeout: DEFAULT_TIMEOUT,
            defaults: SamplingOptions::default().with_model(DEFAULT_MODEL),
            beta_header: Some((BETA_HEADER_NAME.to_string(), BETA_HEADER_VALUE.to_string())),
        }
    }
}

impl ClientConfigBuilder {
    pub fn completion_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.completion_api_key = Some(api_key.into());
        self
    }

    pub fn assistant_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.assistant_api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.endpoints = self.endpoints.with_base_url(base_url);
        self
    }

    pub fn endpoint(mut self, kind: RequestKind, url: impl Into<String>) -> Self {
        self.endpoints = self.endpoints.with_endpoint(kind, url);
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.defaults.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.defaults.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.defaults.max_tokens = Some(max_tokens);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.defaults.top_p = Some(top_p);
        self
    }

    pub fn beta_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.beta_header = Some((name.into(), value.into()));
        self
    }

    pub fn without_beta_header(mut self) -> Self {
        self.beta_header = None;
        self
    }

    pub fn build(self) -> Result<ClientConfig, ProviderError> {
        if self.timeout.is_zero() {
            return Err(ProviderError::configuration("timeout must be greater than zero"));
        }

        if let Some(temperature) = self.defaults.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ProviderError::configuration(
                    "temperature must be in the inclusive range 0.0..=2.0",
                ));
            }
        }

        if let Some(top_p) = self.defaults.top_p {
            if !(0.0..=1.0).contains(&top_p) {
                return Err(ProviderError::configuration(
                    "top_p must be in the inclusive range 0.0..=1.0",
                ));
            }
        }

        let credentials = CredentialStore::new();
        if let Some(key) = self.completion_api_key {
            credentials.set_api_key(KeyScope::Completion, key)?;
        }

        if let Some(key) = self.assistant_api_key {
            credentials.set_api_key(KeyScope::Assistant, key)?;
        }

        Ok(ClientConfig {
            credentials: Arc::new(credentials),
            endpoints: self.endpoints,
            retries: self.retries,
            timeout: self.timeout,
            defaults: self.defaults,
            beta_header: self.beta_header,
        })
    }
}

/// Per-call overrides. Unset fields fall back to `ClientConfig` defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOverrides {
    pub sampling: SamplingOptions,
    pub api_key: Option<String>,
    pub retries: Option<u32>,
    pub timeout: Option<Duration>,
}

impl RequestOverrides {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.sampling.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.sampling.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.sampling.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.sampling.top_p = Some(top_p);
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Immutable configuration for a single call, built fresh each time.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    pub kind: RequestKind,
    pub url: String,
    pub api_key: SecretString,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub retries: u32,
    pub timeout: Duration,
    pub headers: Vec<(String, String)>,
}
