//! Transport layer for the spindle client: wire model, configuration,
//! endpoint resolution, and the retrying HTTP executor.
//!
//! ```rust
//! use sprovider::{ClientConfig, Message, RequestKind, RequestOverrides};
//!
//! let config = ClientConfig::builder()
//!     .completion_api_key("sk-test")
//!     .build()
//!     .expect("config should build");
//! let request = config
//!     .request_config(RequestKind::Threads, &RequestOverrides::default())
//!     .expect("key falls back to completion scope");
//!
//! assert_eq!(request.url, "https://api.openai.com/v1/threads");
//! assert!(Message::user("hello").validate().is_ok());
//! ```

mod api;
mod config;
mod credentials;
mod endpoint;
mod error;
mod executor;
mod model;
mod resilience;
mod transport;

pub mod prelude;

pub use api::{
    ApiClient, CompletionOptions, DEFAULT_EMBEDDING_MODEL, EmbeddingOptions, ImageOptions,
    ModerationOptions,
};
pub use config::{
    BETA_HEADER_NAME, BETA_HEADER_VALUE, ClientConfig, ClientConfigBuilder, DEFAULT_MODEL,
    DEFAULT_RETRIES, DEFAULT_TIMEOUT, RequestConfig, RequestOverrides,
};
pub use credentials::{CredentialStore, KeyScope, SecretString};
pub use endpoint::{DEFAULT_BASE_URL, EndpointResolver, RequestKind};
pub use error::{ProviderError, ProviderErrorKind};
pub use executor::HttpExecutor;
pub use model::{
    ContentPart, ImageDetail, ImageUrl, Message, MessageContent, Role, ToolCall, ToolDefinition,
    ToolOutput,
};
pub use resilience::{NoopRequestHooks, RequestHooks, RetryPolicy, execute_with_retry};
#[cfg(feature = "reqwest-transport")]
pub use transport::ReqwestTransport;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};

pub type ProviderFuture<'a, T> = scommon::BoxFuture<'a, T>;
