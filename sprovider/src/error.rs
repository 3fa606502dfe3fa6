//! Shared provider error kinds and error value helpers.
//!
//! ```rust
//! use sprovider::{ProviderError, ProviderErrorKind};
//!
//! let missing_key = ProviderError::configuration("no API key configured");
//! assert!(!missing_key.retryable);
//!
//! let timeout = ProviderError::timeout("temporary timeout");
//! assert!(timeout.retryable);
//!
//! let remote = ProviderError::from_status(503, "{\"error\":{\"message\":\"busy\"}}");
//! assert_eq!(remote.kind, ProviderErrorKind::Unavailable);
//! assert_eq!(remote.status, Some(503));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Configuration,
    Validation,
    UnknownRequestType,
    Authentication,
    RateLimited,
    InvalidRequest,
    Timeout,
    Transport,
    Unavailable,
    Decode,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub retryable: bool,
    pub status: Option<u16>,
    pub body: Option<String>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable,
            status: None,
            body: None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Configuration, message, false)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Validation, message, false)
    }

    pub fn unknown_request_type(request_type: &str) -> Self {
        Self::new(
            ProviderErrorKind::UnknownRequestType,
            format!("unknown request type '{request_type}'"),
            false,
        )
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Authentication, message, false)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimited, message, true)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidRequest, message, false)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message, true)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transport, message, true)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unavailable, message, true)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Decode, message, false)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Other, message, false)
    }

    /// Classifies a non-2xx response.
    ///
    /// Every remote status failure stays retryable: the executor spends its
    /// whole attempt budget on them regardless of the status class.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("request failed with status {status}"));

        let kind = match status {
            401 | 403 => ProviderErrorKind::Authentication,
            429 => ProviderErrorKind::RateLimited,
            408 | 504 => ProviderErrorKind::Timeout,
            400 | 404 | 422 => ProviderErrorKind::InvalidRequest,
            502 | 503 => ProviderErrorKind::Unavailable,
            _ => ProviderErrorKind::Transport,
        };

        Self::new(kind, message, true)
            .with_status(status)
            .with_body(body)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// True when the failure happened below HTTP, before any status arrived.
    pub fn is_transport_fault(&self) -> bool {
        self.status.is_none()
            && matches!(
                self.kind,
                ProviderErrorKind::Transport | ProviderErrorKind::Timeout
            )
    }

    /// Local input and configuration errors are raised before any network call.
    pub fn is_local(&self) -> bool {
        matches!(
            self.kind,
            ProviderErrorKind::Configuration
                | ProviderErrorKind::Validation
                | ProviderErrorKind::UnknownRequestType
        )
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(status) => write!(f, "{:?} [status={}]: {}", self.kind, status, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl Error for ProviderError {}

fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
        .map(ToString::to_string)
}
