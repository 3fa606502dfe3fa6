//! Tool registry keyed by tool name.

use std::future::Future;
use std::sync::Arc;

use scommon::Registry;
use serde_json::Value;
use sprovider::ToolDefinition;

use crate::{FunctionTool, ToolError, ToolHandler};

#[derive(Default)]
pub struct ToolRegistry {
    tools: Registry<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering a second handler under the same name replaces the first.
    pub fn register<T>(&mut self, tool: T)
    where
        T: ToolHandler + 'static,
    {
        let name = tool.definition().name;
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn register_fn<F, Fut>(&mut self, definition: ToolDefinition, handler: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ToolError>> + Send + 'static,
    {
        self.register(FunctionTool::new(definition, handler));
    }

    pub fn register_sync_fn<F>(&mut self, definition: ToolDefinition, handler: F)
    where
        F: Fn(Value) -> Result<Value, ToolError> + Send + Sync + 'static,
    {
        self.register_fn(definition, move |arguments| {
            let output = handler(arguments);
            async move { output }
        });
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.remove(name)
    }

    /// Definitions sorted by name so run payloads are deterministic.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions = self
            .tools
            .values()
            .map(|tool| tool.definition())
            .collect::<Vec<_>>();
        definitions.sort_by(|left, right| left.name.cmp(&right.name));
        definitions
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names = self.tools.keys().cloned().collect::<Vec<_>>();
        names.sort();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}
