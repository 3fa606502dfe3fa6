//! Request kinds and their base URLs.
//!
//! ```rust
//! use sprovider::{EndpointResolver, ProviderErrorKind, RequestKind};
//!
//! let resolver = EndpointResolver::default();
//! assert_eq!(
//!     resolver.resolve(RequestKind::Threads),
//!     "https://api.openai.com/v1/threads"
//! );
//!
//! let error = resolver.resolve_name("speech").expect_err("not a known type");
//! assert_eq!(error.kind, ProviderErrorKind::UnknownRequestType);
//! ```

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::{KeyScope, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Completion,
    Embedding,
    Moderation,
    Images,
    Threads,
}

impl RequestKind {
    pub const ALL: [RequestKind; 5] = [
        Self::Completion,
        Self::Embedding,
        Self::Moderation,
        Self::Images,
        Self::Threads,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completion => "completion",
            Self::Embedding => "embedding",
            Self::Moderation => "moderation",
            Self::Images => "images",
            Self::Threads => "threads",
        }
    }

    fn default_path(&self) -> &'static str {
        match self {
            Self::Completion => "chat/completions",
            Self::Embedding => "embeddings",
            Self::Moderation => "moderations",
            Self::Images => "images/generations",
            Self::Threads => "threads",
        }
    }

    pub fn key_scope(&self) -> KeyScope {
        match self {
            Self::Threads => KeyScope::Assistant,
            _ => KeyScope::Completion,
        }
    }
}

impl Display for RequestKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = ProviderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "completion" => Ok(Self::Completion),
            "embedding" => Ok(Self::Embedding),
            "moderation" => Ok(Self::Moderation),
            "images" => Ok(Self::Images),
            "assistant" | "threads" => Ok(Self::Threads),
            _ => Err(ProviderError::unknown_request_type(value)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EndpointResolver {
    base_url: String,
    overrides: HashMap<RequestKind, String>,
}

impl Default for EndpointResolver {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl EndpointResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            overrides: HashMap::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replaces the full URL for one kind; the base URL no longer applies to it.
    pub fn with_endpoint(mut self, kind: RequestKind, url: impl Into<String>) -> Self {
        self.overrides.insert(kind, url.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn resolve(&self, kind: RequestKind) -> String {
        if let Some(url) = self.overrides.get(&kind) {
            return url.trim_end_matches('/').to_string();
        }

        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            kind.default_path()
        )
    }

    pub fn resolve_name(&self, request_type: &str) -> Result<String, ProviderError> {
        let kind = request_type.parse::<RequestKind>()?;
        Ok(self.resolve(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_resolves_under_default_base() {
        let resolver = EndpointResolver::default();
        assert_eq!(
            resolver.resolve(RequestKind::Completion),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            resolver.resolve(RequestKind::Embedding),
            "https://api.openai.com/v1/embeddings"
        );
        assert_eq!(
            resolver.resolve(RequestKind::Moderation),
            "https://api.openai.com/v1/moderations"
        );
        assert_eq!(
            resolver.resolve(RequestKind::Images),
            "https://api.openai.com/v1/images/generations"
        );
    }

    #[test]
    fn assistant_alias_maps_to_threads() {
        assert_eq!("assistant".parse::<RequestKind>(), Ok(RequestKind::Threads));
        assert_eq!("Threads".parse::<RequestKind>(), Ok(RequestKind::Threads));
        assert_eq!(RequestKind::Threads.key_scope(), KeyScope::Assistant);
        assert_eq!(RequestKind::Images.key_scope(), KeyScope::Completion);
    }

    #[test]
    fn overrides_and_base_url_apply() {
        let resolver = EndpointResolver::new("http://localhost:8080/v1/")
            .with_endpoint(RequestKind::Embedding, "http://embed.local/e/");

        assert_eq!(
            resolver.resolve(RequestKind::Threads),
            "http://localhost:8080/v1/threads"
        );
        assert_eq!(
            resolver.resolve(RequestKind::Embedding),
            "http://embed.local/e"
        );
    }

    #[test]
    fn unknown_names_fail() {
        let resolver = EndpointResolver::default();
        assert!(resolver.resolve_name("audio").is_err());
        assert_eq!(
            resolver.resolve_name("moderation").expect("known type"),
            "https://api.openai.com/v1/moderations"
        );
    }
}
