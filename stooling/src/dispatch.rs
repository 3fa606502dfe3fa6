//! Dispatch of remote tool calls to registered local handlers.

use std::sync::Arc;
use std::time::Instant;

use sprovider::{ToolCall, ToolOutput};

use crate::{NoopToolDispatchHooks, ToolDispatchHooks, ToolError, ToolRegistry};

/// What to do with a tool call whose name has no registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedToolPolicy {
    /// Produce no output entry for the call.
    #[default]
    Skip,
    /// Fail the dispatch with a `NotFound` error.
    Fail,
}

#[derive(Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    policy: UnmatchedToolPolicy,
    hooks: Arc<dyn ToolDispatchHooks>,
}

impl Default for ToolDispatcher {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()))
    }
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            policy: UnmatchedToolPolicy::default(),
            hooks: Arc::new(NoopToolDispatchHooks),
        }
    }

    pub fn with_policy(mut self, policy: UnmatchedToolPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolDispatchHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn policy(&self) -> UnmatchedToolPolicy {
        self.policy
    }

    /// Runs the handler registered for `tool_call.name`. `Ok(None)` means the
    /// call was skipped under [`UnmatchedToolPolicy::Skip`].
    pub async fn dispatch(&self, tool_call: &ToolCall) -> Result<Option<ToolOutput>, ToolError> {
        let Some(tool) = self.registry.get(&tool_call.name) else {
            return match self.policy {
                UnmatchedToolPolicy::Skip => {
                    tracing::debug!(
                        tool_name = tool_call.name,
                        tool_call_id = tool_call.id,
                        "no handler registered; skipping tool call"
                    );
                    self.hooks.on_dispatch_skipped(tool_call);
                    Ok(None)
                }
                UnmatchedToolPolicy::Fail => Err(ToolError::not_found(format!(
                    "no handler registered for tool '{}'",
                    tool_call.name
                ))
                .with_tool_name(tool_call.name.clone())
                .with_tool_call_id(tool_call.id.clone())),
            };
        };

        self.hooks.on_dispatch_start(tool_call);
        let started = Instant::now();

        match tool.invoke(&tool_call.arguments).await {
            Ok(value) => {
                let output = ToolOutput::from_value(tool_call.id.clone(), &value);
                self.hooks
                    .on_dispatch_success(tool_call, &output, started.elapsed());
                Ok(Some(output))
            }
            Err(error) => {
                let error = error
                    .with_tool_name(tool_call.name.clone())
                    .with_tool_call_id(tool_call.id.clone());
                self.hooks
                    .on_dispatch_failure(tool_call, &error, started.elapsed());
                Err(error)
            }
        }
    }

    /// Dispatches every call in order, stopping at the first error.
    pub async fn dispatch_all(&self, tool_calls: &[ToolCall]) -> Result<Vec<ToolOutput>, ToolError> {
        let mut outputs = Vec::with_capacity(tool_calls.len());
        for tool_call in tool_calls {
            if let Some(output) = self.dispatch(tool_call).await? {
                outputs.push(output);
            }
        }

        Ok(outputs)
    }
}

impl std::fmt::Debug for ToolDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDispatcher")
            .field("registry", &self.registry)
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::{Value, json};
    use sprovider::ToolDefinition;

    use super::*;
    use crate::{ToolErrorKind, ToolFuture, ToolHandler};

    #[derive(Debug, Default)]
    struct CountingWeather {
        calls: AtomicUsize,
    }

    impl ToolHandler for CountingWeather {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("get_weather", "Weather by city", json!({"type": "object"}))
        }

        fn invoke<'a>(&'a self, arguments: &'a Value) -> ToolFuture<'a, Result<Value, ToolError>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                let city = arguments["city"].as_str().unwrap_or("unknown");
                Ok(json!({"city": city, "forecast": "sunny"}))
            })
        }
    }

    fn call(id: &str, name: &str, arguments: Value) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    #[derive(Default)]
    struct SkipLog {
        skipped: Mutex<Vec<String>>,
    }

    impl ToolDispatchHooks for SkipLog {
        fn on_dispatch_skipped(&self, tool_call: &ToolCall) {
            self.skipped
                .lock()
                .expect("skipped lock")
                .push(tool_call.name.clone());
        }
    }

    #[tokio::test]
    async fn registered_handler_output_is_serialized() {
        let mut registry = ToolRegistry::new();
        registry.register(CountingWeather::default());
        let dispatcher = ToolDispatcher::new(Arc::new(registry));

        let output = dispatcher
            .dispatch(&call("call_1", "get_weather", json!({"city": "Oslo"})))
            .await
            .expect("dispatch")
            .expect("handler registered");

        assert_eq!(output.tool_call_id, "call_1");
        assert_eq!(output.output, "{\"city\":\"Oslo\",\"forecast\":\"sunny\"}");
    }

    #[tokio::test]
    async fn string_results_are_submitted_verbatim() {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(
            ToolDefinition::new("greet", "Greets", json!({"type": "object"})),
            |_| Ok(Value::String("hello".to_string())),
        );
        let dispatcher = ToolDispatcher::new(Arc::new(registry));

        let output = dispatcher
            .dispatch(&call("call_2", "greet", json!({})))
            .await
            .expect("dispatch")
            .expect("handler registered");
        assert_eq!(output.output, "hello");
    }

    #[tokio::test]
    async fn unmatched_calls_are_skipped_by_default() {
        let hooks = Arc::new(SkipLog::default());
        let dispatcher = ToolDispatcher::default().with_hooks(hooks.clone());

        let output = dispatcher
            .dispatch(&call("call_3", "missing", json!({})))
            .await
            .expect("lenient dispatch");

        assert!(output.is_none());
        assert_eq!(*hooks.skipped.lock().expect("skipped lock"), vec!["missing"]);
    }

    #[tokio::test]
    async fn strict_policy_fails_unmatched_calls() {
        let dispatcher = ToolDispatcher::default().with_policy(UnmatchedToolPolicy::Fail);

        let error = dispatcher
            .dispatch(&call("call_4", "missing", json!({})))
            .await
            .expect_err("strict dispatch");

        assert_eq!(error.kind, ToolErrorKind::NotFound);
        assert_eq!(error.tool_call_id.as_deref(), Some("call_4"));
    }

    #[tokio::test]
    async fn dispatch_all_invokes_each_handler_once_and_drops_unmatched() {
        let weather = Arc::new(CountingWeather::default());
        let mut registry = ToolRegistry::new();
        let counter = Arc::clone(&weather);
        registry.register_fn(weather.definition(), move |arguments| {
            let counter = Arc::clone(&counter);
            async move { counter.invoke(&arguments).await }
        });
        let dispatcher = ToolDispatcher::new(Arc::new(registry));

        let outputs = dispatcher
            .dispatch_all(&[
                call("call_a", "get_weather", json!({"city": "Rome"})),
                call("call_b", "unknown_tool", json!({})),
                call("call_c", "get_weather", json!({"city": "Lima"})),
            ])
            .await
            .expect("dispatch all");

        let ids = outputs
            .iter()
            .map(|output| output.tool_call_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["call_a", "call_c"]);
        assert_eq!(weather.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn handler_errors_carry_call_context() {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(
            ToolDefinition::new("explode", "Always fails", json!({"type": "object"})),
            |_| Err(ToolError::execution("tool exploded")),
        );
        let dispatcher = ToolDispatcher::new(Arc::new(registry));

        let error = dispatcher
            .dispatch(&call("call_5", "explode", json!({})))
            .await
            .expect_err("handler fails");

        assert_eq!(error.kind, ToolErrorKind::Execution);
        assert_eq!(error.tool_name.as_deref(), Some("explode"));
    }

    #[test]
    fn registry_tracks_registered_tools() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(CountingWeather::default());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("get_weather"));
        assert_eq!(registry.definitions().len(), 1);

        let removed = registry.remove("get_weather");
        assert!(removed.is_some());
        assert!(registry.is_empty());
    }
}
