//! Run snapshots, lifecycle phases, poll policy, and orchestration requests.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use sprovider::Message;
//! use sthread::{AssistantRequest, PollPolicy, RunStatus};
//!
//! let request = AssistantRequest::new("asst_123", vec![Message::user("hi")])
//!     .with_instructions("Answer briefly")
//!     .with_poll_policy(PollPolicy::default().with_max_polls(Some(10)));
//!
//! assert_eq!(request.poll_policy.max_polls, Some(10));
//! assert_eq!(request.poll_policy.interval, Duration::from_secs(2));
//! assert!(RunStatus::Expired.is_failure());
//! ```

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use scommon::{RunId, ThreadId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sprovider::{Message, RequestOverrides, ToolDefinition};
use stooling::{ToolRegistry, UnmatchedToolPolicy};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_POLLS: u32 = 60;
pub const DEFAULT_MESSAGE_LIMIT: u32 = 100;

/// Remote run status. Values the client does not recognise decode as
/// `Unknown` and keep the poll loop going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Completed,
    Failed,
    Cancelled,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::Unknown => "unknown",
        }
    }

    /// Remote-reported failure; never retried.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled | Self::Expired)
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Completed || self.is_failure()
    }

    pub(crate) fn from_json(value: Option<&Value>) -> Self {
        value
            .cloned()
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or(Self::Unknown)
    }
}

impl Display for RunStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last-seen snapshot of a remote run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub id: RunId,
    pub thread_id: ThreadId,
    pub status: RunStatus,
}

impl Run {
    pub fn new(id: impl Into<RunId>, thread_id: impl Into<ThreadId>, status: RunStatus) -> Self {
        Self {
            id: id.into(),
            thread_id: thread_id.into(),
            status,
        }
    }

    /// Reads a run resource body. A missing `id` keeps the id already known,
    /// a missing or unrecognised `status` reads as `Unknown`.
    pub(crate) fn refreshed(&self, body: &Value) -> Self {
        let id = body
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
            .map(RunId::from)
            .unwrap_or_else(|| self.id.clone());

        Self {
            id,
            thread_id: self.thread_id.clone(),
            status: RunStatus::from_json(body.get("status")),
        }
    }
}

/// Lifecycle phases reported to [`crate::ThreadRunHooks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    Created,
    MessagesAppended,
    Running,
    RequiresAction,
    Completed,
    Failed,
    Cancelled,
    Expired,
    TimedOut,
    /// Stopped locally through a cancellation token.
    Aborted,
}

impl RunPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::MessagesAppended => "messages_appended",
            Self::Running => "running",
            Self::RequiresAction => "requires_action",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::TimedOut => "timed_out",
            Self::Aborted => "aborted",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed
                | Self::Failed
                | Self::Cancelled
                | Self::Expired
                | Self::TimedOut
                | Self::Aborted
        )
    }

    pub(crate) fn for_status(status: RunStatus) -> Self {
        match status {
            RunStatus::RequiresAction => Self::RequiresAction,
            RunStatus::Completed => Self::Completed,
            RunStatus::Failed => Self::Failed,
            RunStatus::Cancelled => Self::Cancelled,
            RunStatus::Expired => Self::Expired,
            RunStatus::Queued | RunStatus::InProgress | RunStatus::Unknown => Self::Running,
        }
    }
}

impl Display for RunPhase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-interval polling by default. A multiplier above 1.0 grows the
/// interval up to `max_interval`; the interval never drops below `interval`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_interval: Duration,
    pub backoff_multiplier: f64,
    /// `None` polls until a terminal status arrives.
    pub max_polls: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_interval: DEFAULT_POLL_INTERVAL,
            backoff_multiplier: 1.0,
            max_polls: Some(DEFAULT_MAX_POLLS),
        }
    }
}

impl PollPolicy {
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            max_interval: interval,
            ..Self::default()
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_interval(mut self, max_interval: Duration) -> Self {
        self.max_interval = max_interval;
        self
    }

    pub fn with_backoff_multiplier(mut self, backoff_multiplier: f64) -> Self {
        self.backoff_multiplier = backoff_multiplier;
        self
    }

    pub fn with_max_polls(mut self, max_polls: Option<u32>) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// Sleep before poll number `poll` (1-based).
    pub fn interval_for(&self, poll: u32) -> Duration {
        let exponent = i32::try_from(poll.saturating_sub(1)).unwrap_or(i32::MAX);
        let multiplier = self.backoff_multiplier.max(1.0).powi(exponent);
        let ceiling = self.max_interval.max(self.interval);

        let seconds = self.interval.as_secs_f64() * multiplier;
        if !seconds.is_finite() || seconds >= ceiling.as_secs_f64() {
            return ceiling;
        }

        Duration::from_secs_f64(seconds).max(self.interval)
    }

    pub(crate) fn exhausted(&self, polls: u32) -> bool {
        self.max_polls.is_some_and(|max_polls| polls >= max_polls)
    }
}

/// Parameters sent when starting a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSpec {
    pub assistant_id: String,
    pub tools: Vec<ToolDefinition>,
    pub instructions: Option<String>,
}

impl RunSpec {
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            tools: Vec::new(),
            instructions: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

/// One end-to-end assistant invocation.
#[derive(Debug, Clone)]
pub struct AssistantRequest {
    pub assistant_id: String,
    pub messages: Vec<Message>,
    /// Advertised on the run. Empty means "use the registry's definitions".
    pub tools: Vec<ToolDefinition>,
    pub handlers: Arc<ToolRegistry>,
    pub unmatched_tools: UnmatchedToolPolicy,
    pub overrides: RequestOverrides,
    pub thread_id: Option<ThreadId>,
    pub instructions: Option<String>,
    pub poll_policy: PollPolicy,
    pub cancellation: Option<CancellationToken>,
}

impl AssistantRequest {
    pub fn new(assistant_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            messages,
            tools: Vec::new(),
            handlers: Arc::new(ToolRegistry::new()),
            unmatched_tools: UnmatchedToolPolicy::default(),
            overrides: RequestOverrides::default(),
            thread_id: None,
            instructions: None,
            poll_policy: PollPolicy::default(),
            cancellation: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_handlers(mut self, handlers: impl Into<Arc<ToolRegistry>>) -> Self {
        self.handlers = handlers.into();
        self
    }

    pub fn with_unmatched_tools(mut self, policy: UnmatchedToolPolicy) -> Self {
        self.unmatched_tools = policy;
        self
    }

    pub fn with_overrides(mut self, overrides: RequestOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.overrides = self.overrides.with_model(model);
        self
    }

    /// Appends to an existing thread instead of creating one.
    pub fn with_thread_id(mut self, thread_id: impl Into<ThreadId>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_poll_policy(mut self, poll_policy: PollPolicy) -> Self {
        self.poll_policy = poll_policy;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn run_spec(&self) -> RunSpec {
        let tools = if self.tools.is_empty() {
            self.handlers.definitions()
        } else {
            self.tools.clone()
        };

        RunSpec {
            assistant_id: self.assistant_id.clone(),
            tools,
            instructions: self.instructions.clone(),
        }
    }
}

/// Result of driving a run to `completed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    pub run: Run,
    pub polls: u32,
    pub submissions: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantRunOutcome {
    pub thread_id: ThreadId,
    pub run: Run,
    pub polls: u32,
    pub submissions: u32,
    /// Raw message records in ascending creation order.
    pub messages: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unrecognised_statuses_decode_as_unknown() {
        assert_eq!(
            RunStatus::from_json(Some(&json!("requires_action"))),
            RunStatus::RequiresAction
        );
        assert_eq!(RunStatus::from_json(Some(&json!("cancelling"))), RunStatus::Unknown);
        assert_eq!(RunStatus::from_json(None), RunStatus::Unknown);
    }

    #[test]
    fn refreshed_run_keeps_known_ids() {
        let run = Run::new("run_1", "thread_1", RunStatus::Queued);
        let next = run.refreshed(&json!({"status": "in_progress"}));

        assert_eq!(next.id.as_str(), "run_1");
        assert_eq!(next.thread_id.as_str(), "thread_1");
        assert_eq!(next.status, RunStatus::InProgress);
    }

    #[test]
    fn default_poll_policy_is_fixed_two_seconds() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval_for(1), Duration::from_secs(2));
        assert_eq!(policy.interval_for(30), Duration::from_secs(2));
        assert!(!policy.exhausted(59));
        assert!(policy.exhausted(60));
    }

    #[test]
    fn backoff_grows_to_ceiling_and_never_below_minimum() {
        let policy = PollPolicy::fixed(Duration::from_secs(2))
            .with_backoff_multiplier(2.0)
            .with_max_interval(Duration::from_secs(10));

        assert_eq!(policy.interval_for(1), Duration::from_secs(2));
        assert_eq!(policy.interval_for(2), Duration::from_secs(4));
        assert_eq!(policy.interval_for(3), Duration::from_secs(8));
        assert_eq!(policy.interval_for(4), Duration::from_secs(10));

        let shrinking = PollPolicy::default().with_backoff_multiplier(0.5);
        assert_eq!(shrinking.interval_for(5), Duration::from_secs(2));
    }

    #[test]
    fn unbounded_policy_never_exhausts() {
        assert!(!PollPolicy::default().with_max_polls(None).exhausted(u32::MAX));
    }

    #[test]
    fn run_spec_falls_back_to_registry_definitions() {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(
            ToolDefinition::new("lookup", "Lookup", json!({"type": "object"})),
            |_| Ok(json!("ok")),
        );

        let request = AssistantRequest::new("asst_1", vec![Message::user("hi")])
            .with_handlers(registry);
        assert_eq!(request.run_spec().tools[0].name, "lookup");

        let explicit = request.with_tools(vec![ToolDefinition::new(
            "other",
            "Other",
            json!({"type": "object"}),
        )]);
        assert_eq!(explicit.run_spec().tools[0].name, "other");
    }
}
