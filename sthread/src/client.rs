//! Assistant thread orchestration: create a thread, append messages, start a
//! run, poll it to a terminal status while answering tool calls, then read
//! back the thread's messages.
//!
//! Every remote call goes through the shared [`HttpExecutor`], so transport
//! faults are retried within a single step only. Remote-reported run failures
//! are never retried.

use std::sync::Arc;
use std::time::Duration;

use scommon::{RunId, ThreadId};
use serde::Deserialize;
use serde_json::{Value, json};
use sprovider::{
    ClientConfig, HttpExecutor, Message, ProviderError, RequestConfig, RequestKind,
    RequestOverrides, ToolCall, ToolDefinition, ToolOutput,
};
use stooling::{NoopToolDispatchHooks, ToolDispatchHooks, ToolDispatcher, ToolError, decode_arguments};
use tokio_util::sync::CancellationToken;

use crate::{
    AssistantRequest, AssistantRunOutcome, DEFAULT_MESSAGE_LIMIT, NoopThreadRunHooks, PollOutcome,
    PollPolicy, Run, RunPhase, RunSpec, RunStatus, ThreadError, ThreadErrorKind, ThreadRunHooks,
};

#[derive(Clone)]
pub struct ThreadClient {
    config: Arc<ClientConfig>,
    executor: Arc<HttpExecutor>,
    hooks: Arc<dyn ThreadRunHooks>,
    tool_hooks: Arc<dyn ToolDispatchHooks>,
    message_limit: u32,
}

impl ThreadClient {
    pub fn new(config: Arc<ClientConfig>, executor: Arc<HttpExecutor>) -> Self {
        Self {
            config,
            executor,
            hooks: Arc::new(NoopThreadRunHooks),
            tool_hooks: Arc::new(NoopToolDispatchHooks),
            message_limit: DEFAULT_MESSAGE_LIMIT,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ThreadRunHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Hooks handed to the dispatcher built for each [`ThreadClient::run`].
    pub fn with_tool_hooks(mut self, hooks: Arc<dyn ToolDispatchHooks>) -> Self {
        self.tool_hooks = hooks;
        self
    }

    pub fn with_message_limit(mut self, limit: u32) -> Self {
        self.message_limit = limit.max(1);
        self
    }

    pub fn config(&self) -> &Arc<ClientConfig> {
        &self.config
    }

    /// Drives one assistant invocation end to end and returns the thread's
    /// final message list with run diagnostics.
    ///
    /// Input and configuration problems fail before any network call.
    pub async fn run(&self, request: AssistantRequest) -> Result<AssistantRunOutcome, ThreadError> {
        validate_assistant_id(&request.assistant_id)?;
        validate_messages(&request.messages)?;
        if let Some(thread_id) = &request.thread_id
            && thread_id.is_blank()
        {
            return Err(ThreadError::validation("thread id must not be empty"));
        }

        let config = self.request_config(&request.overrides)?;
        ensure_active(request.cancellation.as_ref())?;

        let mut timeline = Timeline::new(self.hooks.as_ref());
        let result = self.drive(&request, &config, &mut timeline).await;
        result.map_err(|error| timeline.fail(error))
    }

    /// Same as [`ThreadClient::run`], keeping only the messages.
    pub async fn assistant(&self, request: AssistantRequest) -> Result<Vec<Value>, ThreadError> {
        self.run(request).await.map(|outcome| outcome.messages)
    }

    pub async fn create_thread(&self, overrides: &RequestOverrides) -> Result<ThreadId, ThreadError> {
        let config = self.request_config(overrides)?;
        let mut timeline = Timeline::new(self.hooks.as_ref());
        let result = self.create_thread_with(&config, &mut timeline).await;
        result.map_err(|error| timeline.fail(error))
    }

    /// Appends in input order, one request per message. A failure part way
    /// through leaves the earlier messages on the thread.
    pub async fn append_messages(
        &self,
        thread_id: &ThreadId,
        messages: &[Message],
        overrides: &RequestOverrides,
    ) -> Result<usize, ThreadError> {
        validate_thread_id(thread_id)?;
        validate_messages(messages)?;
        let config = self.request_config(overrides)?;

        let mut timeline = Timeline::new(self.hooks.as_ref());
        timeline.attach_thread(thread_id.clone());
        let result = self
            .append_messages_with(&config, thread_id, messages, &mut timeline)
            .await;
        result.map_err(|error| timeline.fail(error))
    }

    pub async fn start_run(
        &self,
        thread_id: &ThreadId,
        spec: &RunSpec,
        overrides: &RequestOverrides,
    ) -> Result<Run, ThreadError> {
        validate_thread_id(thread_id)?;
        validate_assistant_id(&spec.assistant_id)?;
        let config = self.request_config(overrides)?;

        let mut timeline = Timeline::new(self.hooks.as_ref());
        timeline.attach_thread(thread_id.clone());
        let result = self
            .start_run_with(&config, thread_id, spec, &mut timeline)
            .await;
        result.map_err(|error| timeline.fail(error))
    }

    /// Polls `run` until it completes, answering `requires_action` with
    /// `dispatcher`. Ends with `RunFailed`, `PollTimeout` or `Cancelled`
    /// otherwise.
    pub async fn poll_until_complete(
        &self,
        run: &Run,
        dispatcher: &ToolDispatcher,
        policy: &PollPolicy,
        overrides: &RequestOverrides,
        cancellation: Option<&CancellationToken>,
    ) -> Result<PollOutcome, ThreadError> {
        let config = self.request_config(overrides)?;

        let mut timeline = Timeline::for_run(self.hooks.as_ref(), run);
        let result = self
            .poll_with(&config, run, dispatcher, policy, cancellation, &mut timeline)
            .await;
        result.map_err(|error| timeline.fail(error))
    }

    /// Raw message records, oldest first.
    pub async fn fetch_messages(
        &self,
        thread_id: &ThreadId,
        overrides: &RequestOverrides,
    ) -> Result<Vec<Value>, ThreadError> {
        validate_thread_id(thread_id)?;
        let config = self.request_config(overrides)?;
        self.fetch_messages_with(&config, thread_id).await
    }

    fn request_config(&self, overrides: &RequestOverrides) -> Result<RequestConfig, ThreadError> {
        Ok(self.config.request_config(RequestKind::Threads, overrides)?)
    }

    async fn drive(
        &self,
        request: &AssistantRequest,
        config: &RequestConfig,
        timeline: &mut Timeline<'_>,
    ) -> Result<AssistantRunOutcome, ThreadError> {
        let cancellation = request.cancellation.as_ref();

        let thread_id = match &request.thread_id {
            Some(thread_id) => {
                timeline.attach_thread(thread_id.clone());
                thread_id.clone()
            }
            None => self.create_thread_with(config, timeline).await?,
        };

        ensure_active(cancellation)?;
        self.append_messages_with(config, &thread_id, &request.messages, timeline)
            .await?;

        ensure_active(cancellation)?;
        let run = self
            .start_run_with(config, &thread_id, &request.run_spec(), timeline)
            .await?;

        let dispatcher = ToolDispatcher::new(Arc::clone(&request.handlers))
            .with_policy(request.unmatched_tools)
            .with_hooks(Arc::clone(&self.tool_hooks));
        let outcome = self
            .poll_with(
                config,
                &run,
                &dispatcher,
                &request.poll_policy,
                cancellation,
                timeline,
            )
            .await?;

        let messages = self.fetch_messages_with(config, &thread_id).await?;

        Ok(AssistantRunOutcome {
            thread_id,
            run: outcome.run,
            polls: outcome.polls,
            submissions: outcome.submissions,
            messages,
        })
    }

    async fn create_thread_with(
        &self,
        config: &RequestConfig,
        timeline: &mut Timeline<'_>,
    ) -> Result<ThreadId, ThreadError> {
        let body = self
            .executor
            .send("create_thread", config, &config.url, json!({}))
            .await?;

        let Some(id) = non_blank_id(&body) else {
            return Err(
                ThreadError::thread_creation("thread response did not include an id").with_body(body),
            );
        };

        let thread_id = ThreadId::new(id);
        timeline.attach_thread(thread_id.clone());
        timeline.advance(RunPhase::Created);
        Ok(thread_id)
    }

    async fn append_messages_with(
        &self,
        config: &RequestConfig,
        thread_id: &ThreadId,
        messages: &[Message],
        timeline: &mut Timeline<'_>,
    ) -> Result<usize, ThreadError> {
        let url = messages_url(config, thread_id);

        for (index, message) in messages.iter().enumerate() {
            tracing::debug!(
                thread_id = %thread_id,
                index,
                role = %message.role,
                "appending thread message"
            );
            self.executor
                .send("append_message", config, &url, message.to_thread_payload())
                .await?;
        }

        timeline.advance(RunPhase::MessagesAppended);
        Ok(messages.len())
    }

    async fn start_run_with(
        &self,
        config: &RequestConfig,
        thread_id: &ThreadId,
        spec: &RunSpec,
        timeline: &mut Timeline<'_>,
    ) -> Result<Run, ThreadError> {
        let mut payload = json!({
            "assistant_id": spec.assistant_id,
            "model": config.model,
            "tools": spec
                .tools
                .iter()
                .map(ToolDefinition::to_function_tool)
                .collect::<Vec<_>>(),
            "tool_choice": "auto",
        });
        if let Some(instructions) = &spec.instructions {
            payload["instructions"] = Value::String(instructions.clone());
        }

        let body = self
            .executor
            .send("start_run", config, &runs_url(config, thread_id), payload)
            .await?;

        let Some(id) = non_blank_id(&body) else {
            return Err(ThreadError::run_creation("run response did not include an id").with_body(body));
        };

        let run = Run::new(
            id,
            thread_id.clone(),
            RunStatus::from_json(body.get("status")),
        );
        timeline.attach_run(run.id.clone());
        timeline.advance(RunPhase::Running);
        Ok(run)
    }

    async fn poll_with(
        &self,
        config: &RequestConfig,
        run: &Run,
        dispatcher: &ToolDispatcher,
        policy: &PollPolicy,
        cancellation: Option<&CancellationToken>,
        timeline: &mut Timeline<'_>,
    ) -> Result<PollOutcome, ThreadError> {
        let url = run_url(config, &run.thread_id, &run.id);
        let mut current = run.clone();
        let mut polls = 0;
        let mut submissions = 0;

        loop {
            if policy.exhausted(polls) {
                timeline.advance(RunPhase::TimedOut);
                return Err(ThreadError::poll_timeout(polls, current.status));
            }

            pause(policy.interval_for(polls + 1), cancellation).await?;
            polls += 1;

            let body =
                unless_cancelled(self.executor.get("poll_run", config, &url), cancellation).await?;
            current = current.refreshed(&body);
            tracing::debug!(
                thread_id = %current.thread_id,
                run_id = %current.id,
                status = %current.status,
                poll = polls,
                "polled run"
            );
            self.hooks.on_poll(&current, polls);
            ensure_active(cancellation)?;
            timeline.advance(RunPhase::for_status(current.status));

            match current.status {
                RunStatus::Completed => {
                    return Ok(PollOutcome {
                        run: current,
                        polls,
                        submissions,
                    });
                }
                status if status.is_failure() => {
                    return Err(ThreadError::run_failed(status, body));
                }
                RunStatus::RequiresAction => {
                    let tool_calls = pending_tool_calls(&body)?;
                    let outputs = dispatcher.dispatch_all(&tool_calls).await?;

                    if outputs.is_empty() {
                        tracing::warn!(
                            run_id = %current.id,
                            pending = tool_calls.len(),
                            "no tool outputs to submit; continuing to poll"
                        );
                        continue;
                    }

                    ensure_active(cancellation)?;
                    self.submit_tool_outputs(config, &url, &outputs, cancellation)
                        .await?;
                    submissions += 1;
                    self.hooks.on_tool_outputs_submitted(&current, &outputs);
                    timeline.advance(RunPhase::Running);
                }
                _ => {}
            }
        }
    }

    async fn submit_tool_outputs(
        &self,
        config: &RequestConfig,
        run_url: &str,
        outputs: &[ToolOutput],
        cancellation: Option<&CancellationToken>,
    ) -> Result<(), ThreadError> {
        let url = format!("{run_url}/submit_tool_outputs");
        let body = json!({ "tool_outputs": outputs });
        unless_cancelled(
            self.executor.send("submit_tool_outputs", config, &url, body),
            cancellation,
        )
        .await?;
        Ok(())
    }

    async fn fetch_messages_with(
        &self,
        config: &RequestConfig,
        thread_id: &ThreadId,
    ) -> Result<Vec<Value>, ThreadError> {
        let url = format!(
            "{}?limit={}&order=asc",
            messages_url(config, thread_id),
            self.message_limit
        );
        let body = self.executor.get("list_messages", config, &url).await?;

        match body.get("data").and_then(Value::as_array) {
            Some(messages) => Ok(messages.clone()),
            None => Err(ThreadError::from(ProviderError::decode(
                "message list response did not include 'data'",
            ))
            .with_body(body)),
        }
    }
}

impl std::fmt::Debug for ThreadClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadClient")
            .field("executor", &self.executor)
            .field("message_limit", &self.message_limit)
            .finish()
    }
}

/// Phase bookkeeping for one orchestration call. Hooks only hear about
/// actual transitions.
struct Timeline<'a> {
    hooks: &'a dyn ThreadRunHooks,
    thread_id: Option<ThreadId>,
    run_id: Option<RunId>,
    phase: Option<RunPhase>,
}

impl<'a> Timeline<'a> {
    fn new(hooks: &'a dyn ThreadRunHooks) -> Self {
        Self {
            hooks,
            thread_id: None,
            run_id: None,
            phase: None,
        }
    }

    fn for_run(hooks: &'a dyn ThreadRunHooks, run: &Run) -> Self {
        Self {
            hooks,
            thread_id: Some(run.thread_id.clone()),
            run_id: Some(run.id.clone()),
            phase: Some(RunPhase::Running),
        }
    }

    fn attach_thread(&mut self, thread_id: ThreadId) {
        self.thread_id = Some(thread_id);
    }

    fn attach_run(&mut self, run_id: RunId) {
        self.run_id = Some(run_id);
    }

    fn advance(&mut self, phase: RunPhase) {
        if self.phase == Some(phase) {
            return;
        }
        self.phase = Some(phase);

        let Some(thread_id) = &self.thread_id else {
            return;
        };
        tracing::info!(
            thread_id = %thread_id,
            run_id = self.run_id.as_ref().map(RunId::as_str),
            phase = %phase,
            "thread run phase changed"
        );
        self.hooks
            .on_phase_change(thread_id, self.run_id.as_ref(), phase);
    }

    fn fail(&mut self, error: ThreadError) -> ThreadError {
        if error.kind == ThreadErrorKind::Cancelled
            && !self.phase.is_some_and(RunPhase::is_terminal)
        {
            self.advance(RunPhase::Aborted);
        }

        tracing::warn!(
            thread_id = self.thread_id.as_ref().map(ThreadId::as_str),
            run_id = self.run_id.as_ref().map(RunId::as_str),
            error_kind = ?error.kind,
            error = %error,
            "thread run failed"
        );
        self.hooks
            .on_run_error(self.thread_id.as_ref(), self.run_id.as_ref(), &error);
        error
    }
}

#[derive(Debug, Deserialize)]
struct RequiredAction {
    submit_tool_outputs: PendingToolOutputs,
}

#[derive(Debug, Deserialize)]
struct PendingToolOutputs {
    #[serde(default)]
    tool_calls: Vec<PendingToolCall>,
}

#[derive(Debug, Deserialize)]
struct PendingToolCall {
    id: String,
    function: PendingFunction,
}

#[derive(Debug, Deserialize)]
struct PendingFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

/// Tool calls listed under `required_action.submit_tool_outputs`, with
/// their argument strings decoded.
fn pending_tool_calls(body: &Value) -> Result<Vec<ToolCall>, ThreadError> {
    let Some(action) = body.get("required_action").filter(|action| !action.is_null()) else {
        return Ok(Vec::new());
    };

    let action = RequiredAction::deserialize(action).map_err(|err| {
        ThreadError::from(ProviderError::decode(format!(
            "malformed required_action: {err}"
        )))
        .with_body(body.clone())
    })?;

    action
        .submit_tool_outputs
        .tool_calls
        .into_iter()
        .map(|call| {
            let arguments = decode_arguments(&call.function.arguments).map_err(|error| {
                error
                    .with_tool_name(call.function.name.clone())
                    .with_tool_call_id(call.id.clone())
            })?;

            Ok(ToolCall {
                id: call.id,
                name: call.function.name,
                arguments,
            })
        })
        .collect::<Result<Vec<_>, ToolError>>()
        .map_err(ThreadError::from)
}

async fn pause(delay: Duration, cancellation: Option<&CancellationToken>) -> Result<(), ThreadError> {
    let Some(token) = cancellation else {
        tokio::time::sleep(delay).await;
        return Ok(());
    };

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(ThreadError::cancelled("run cancelled while waiting to poll")),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}

/// Races a remote call, retries and backoff included, against the token.
/// A cancelled call is dropped locally; the remote side is not told.
async fn unless_cancelled<T>(
    request: impl Future<Output = Result<T, ProviderError>>,
    cancellation: Option<&CancellationToken>,
) -> Result<T, ThreadError> {
    let Some(token) = cancellation else {
        return Ok(request.await?);
    };

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(ThreadError::cancelled("run cancelled during a remote call")),
        result = request => Ok(result?),
    }
}

fn ensure_active(cancellation: Option<&CancellationToken>) -> Result<(), ThreadError> {
    match cancellation {
        Some(token) if token.is_cancelled() => {
            Err(ThreadError::cancelled("run cancelled before completion"))
        }
        _ => Ok(()),
    }
}

fn validate_assistant_id(assistant_id: &str) -> Result<(), ThreadError> {
    if assistant_id.trim().is_empty() {
        return Err(ThreadError::validation("assistant id must not be empty"));
    }

    Ok(())
}

fn validate_thread_id(thread_id: &ThreadId) -> Result<(), ThreadError> {
    if thread_id.is_blank() {
        return Err(ThreadError::validation("thread id must not be empty"));
    }

    Ok(())
}

fn validate_messages(messages: &[Message]) -> Result<(), ThreadError> {
    if messages.is_empty() {
        return Err(ThreadError::validation("at least one message is required"));
    }

    for message in messages {
        message.validate()?;
    }

    Ok(())
}

fn non_blank_id(body: &Value) -> Option<String> {
    body.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
        .map(ToString::to_string)
}

fn messages_url(config: &RequestConfig, thread_id: &ThreadId) -> String {
    format!("{}/{}/messages", config.url, thread_id)
}

fn runs_url(config: &RequestConfig, thread_id: &ThreadId) -> String {
    format!("{}/{}/runs", config.url, thread_id)
}

fn run_url(config: &RequestConfig, thread_id: &ThreadId, run_id: &RunId) -> String {
    format!("{}/{}", runs_url(config, thread_id), run_id)
}
