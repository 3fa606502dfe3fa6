//! Thread-run error types and conversion helpers.
//!
//! ```rust
//! use serde_json::json;
//! use sthread::{RunStatus, ThreadError, ThreadErrorKind};
//!
//! let err = ThreadError::run_failed(RunStatus::Expired, json!({"status": "expired"}));
//! assert_eq!(err.kind, ThreadErrorKind::RunFailed);
//! assert_eq!(err.run_status, Some(RunStatus::Expired));
//! assert!(err.to_string().contains("expired"));
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

use serde_json::Value;
use sprovider::{ProviderError, ProviderErrorKind};
use stooling::ToolError;

use crate::RunStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadErrorKind {
    Configuration,
    Validation,
    ThreadCreation,
    RunCreation,
    /// The remote run ended in `failed`, `cancelled` or `expired`.
    RunFailed,
    PollTimeout,
    /// Stopped locally; the remote run was not notified.
    Cancelled,
    UnhandledToolCall,
    Tooling,
    /// Transport or remote failure that survived the executor's retries.
    Provider,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThreadError {
    pub kind: ThreadErrorKind,
    pub message: String,
    pub run_status: Option<RunStatus>,
    pub body: Option<Value>,
    pub polls: Option<u32>,
    pub provider: Option<ProviderError>,
    pub tool: Option<ToolError>,
}

impl ThreadError {
    pub fn new(kind: ThreadErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            run_status: None,
            body: None,
            polls: None,
            provider: None,
            tool: None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ThreadErrorKind::Configuration, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ThreadErrorKind::Validation, message)
    }

    pub fn thread_creation(message: impl Into<String>) -> Self {
        Self::new(ThreadErrorKind::ThreadCreation, message)
    }

    pub fn run_creation(message: impl Into<String>) -> Self {
        Self::new(ThreadErrorKind::RunCreation, message)
    }

    pub fn run_failed(status: RunStatus, body: Value) -> Self {
        let detail = body
            .get("last_error")
            .and_then(|error| error.get("message"))
            .and_then(Value::as_str)
            .map(|message| format!(": {message}"))
            .unwrap_or_default();

        let mut error = Self::new(
            ThreadErrorKind::RunFailed,
            format!("run ended with status '{status}'{detail}"),
        );
        error.run_status = Some(status);
        error.body = Some(body);
        error
    }

    pub fn poll_timeout(polls: u32, last_status: RunStatus) -> Self {
        let mut error = Self::new(
            ThreadErrorKind::PollTimeout,
            format!("run still '{last_status}' after {polls} polls"),
        );
        error.run_status = Some(last_status);
        error.polls = Some(polls);
        error
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ThreadErrorKind::Cancelled, message)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn is_remote_failure(&self) -> bool {
        self.kind == ThreadErrorKind::RunFailed
    }
}

impl Display for ThreadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for ThreadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        if let Some(provider) = &self.provider {
            return Some(provider);
        }

        self.tool.as_ref().map(|tool| tool as &(dyn Error + 'static))
    }
}

impl From<ProviderError> for ThreadError {
    fn from(value: ProviderError) -> Self {
        let kind = match value.kind {
            ProviderErrorKind::Configuration => ThreadErrorKind::Configuration,
            ProviderErrorKind::Validation => ThreadErrorKind::Validation,
            _ => ThreadErrorKind::Provider,
        };

        let mut error = Self::new(kind, value.to_string());
        error.provider = Some(value);
        error
    }
}

impl From<ToolError> for ThreadError {
    fn from(value: ToolError) -> Self {
        let kind = if value.is_unhandled() {
            ThreadErrorKind::UnhandledToolCall
        } else {
            ThreadErrorKind::Tooling
        };

        let mut error = Self::new(kind, value.to_string());
        error.tool = Some(value);
        error
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn provider_errors_keep_local_classes() {
        let missing = ThreadError::from(ProviderError::configuration("no key"));
        assert_eq!(missing.kind, ThreadErrorKind::Configuration);

        let remote = ThreadError::from(ProviderError::from_status(503, ""));
        assert_eq!(remote.kind, ThreadErrorKind::Provider);
        assert_eq!(remote.provider.as_ref().and_then(|err| err.status), Some(503));
        assert!(remote.source().is_some());
    }

    #[test]
    fn tool_errors_split_unhandled_from_failures() {
        let unhandled = ThreadError::from(ToolError::not_found("no handler"));
        assert_eq!(unhandled.kind, ThreadErrorKind::UnhandledToolCall);

        let failed = ThreadError::from(ToolError::execution("boom"));
        assert_eq!(failed.kind, ThreadErrorKind::Tooling);
    }

    #[test]
    fn run_failed_surfaces_remote_last_error() {
        let error = ThreadError::run_failed(
            RunStatus::Failed,
            json!({"status": "failed", "last_error": {"code": "server_error", "message": "overloaded"}}),
        );

        assert!(error.is_remote_failure());
        assert!(error.message.contains("overloaded"));
        assert_eq!(error.body.as_ref().map(|body| body["status"].clone()), Some(json!("failed")));
    }

    #[test]
    fn poll_timeout_records_poll_count() {
        let error = ThreadError::poll_timeout(60, RunStatus::InProgress);
        assert_eq!(error.polls, Some(60));
        assert!(error.to_string().contains("in_progress"));
    }
}
