//! Passthrough calls: chat completion, embeddings, moderation and images.
//!
//! Each call merges `RequestOverrides` over the client defaults, builds a
//! JSON payload and hands it to the shared executor. Responses are returned
//! as decoded JSON.

use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::{
    ClientConfig, HttpExecutor, Message, ProviderError, RequestConfig, RequestKind,
    RequestOverrides, ToolDefinition,
};

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDefinition>,
    pub overrides: RequestOverrides,
}

impl CompletionOptions {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            overrides: RequestOverrides::default(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_overrides(mut self, overrides: RequestOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.messages.is_empty() {
            return Err(ProviderError::validation("at least one message is required"));
        }

        self.messages.iter().try_for_each(Message::validate)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingOptions {
    pub input: Value,
    pub model: String,
    pub overrides: RequestOverrides,
}

impl EmbeddingOptions {
    /// `input` is a string or an array of strings.
    pub fn new(input: impl Into<Value>) -> Self {
        Self {
            input: input.into(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            overrides: RequestOverrides::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModerationOptions {
    pub input: Value,
    pub model: Option<String>,
    pub overrides: RequestOverrides,
}

impl ModerationOptions {
    pub fn new(input: impl Into<Value>) -> Self {
        Self {
            input: input.into(),
            model: None,
            overrides: RequestOverrides::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageOptions {
    pub prompt: String,
    pub model: Option<String>,
    pub n: Option<u32>,
    pub size: Option<String>,
    pub overrides: RequestOverrides,
}

impl ImageOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            n: None,
            size: None,
            overrides: RequestOverrides::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_count(mut self, n: u32) -> Self {
        self.n = Some(n);
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    executor: Arc<HttpExecutor>,
}

impl ApiClient {
    pub fn new(config: Arc<ClientConfig>, executor: Arc<HttpExecutor>) -> Self {
        Self { config, executor }
    }

    pub async fn completion(&self, options: CompletionOptions) -> Result<Value, ProviderError> {
        options.validate()?;
        let config = self
            .config
            .request_config(RequestKind::Completion, &options.overrides)?;
        let payload = completion_payload(&config, &options);

        self.executor
            .send("completion", &config, &config.url, payload)
            .await
    }

    pub async fn embedding(&self, options: EmbeddingOptions) -> Result<Value, ProviderError> {
        require_input(&options.input)?;
        let config = self
            .config
            .request_config(RequestKind::Embedding, &options.overrides)?;
        let payload = json!({
            "model": options.model,
            "input": options.input,
        });

        self.executor
            .send("embedding", &config, &config.url, payload)
            .await
    }

    pub async fn moderation(&self, options: ModerationOptions) -> Result<Value, ProviderError> {
        require_input(&options.input)?;
        let config = self
            .config
            .request_config(RequestKind::Moderation, &options.overrides)?;

        let mut payload = Map::new();
        payload.insert("input".to_string(), options.input);
        if let Some(model) = options.model {
            payload.insert("model".to_string(), Value::String(model));
        }

        self.executor
            .send("moderation", &config, &config.url, Value::Object(payload))
            .await
    }

    pub async fn images(&self, options: ImageOptions) -> Result<Value, ProviderError> {
        if options.prompt.trim().is_empty() {
            return Err(ProviderError::validation("image prompt must not be empty"));
        }

        let config = self
            .config
            .request_config(RequestKind::Images, &options.overrides)?;

        let mut payload = Map::new();
        payload.insert("prompt".to_string(), Value::String(options.prompt));
        if let Some(model) = options.model {
            payload.insert("model".to_string(), Value::String(model));
        }
        if let Some(n) = options.n {
            payload.insert("n".to_string(), json!(n));
        }
        if let Some(size) = options.size {
            payload.insert("size".to_string(), Value::String(size));
        }

        self.executor
            .send("images", &config, &config.url, Value::Object(payload))
            .await
    }
}

fn completion_payload(config: &RequestConfig, options: &CompletionOptions) -> Value {
    let mut payload = Map::new();
    payload.insert("model".to_string(), Value::String(config.model.clone()));
    payload.insert("messages".to_string(), json!(options.messages));

    if let Some(temperature) = config.temperature {
        payload.insert("temperature".to_string(), json!(temperature));
    }
    if let Some(max_tokens) = config.max_tokens {
        payload.insert("max_tokens".to_string(), json!(max_tokens));
    }
    if let Some(top_p) = config.top_p {
        payload.insert("top_p".to_string(), json!(top_p));
    }
    if !options.tools.is_empty() {
        let tools = options
            .tools
            .iter()
            .map(ToolDefinition::to_function_tool)
            .collect::<Vec<_>>();
        payload.insert("tools".to_string(), Value::Array(tools));
    }

    Value::Object(payload)
}

fn require_input(input: &Value) -> Result<(), ProviderError> {
    let empty = match input {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    };

    if empty {
        return Err(ProviderError::validation("input must not be empty"));
    }

    Ok(())
}
