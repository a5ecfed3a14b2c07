//! Tool dispatch - maps tool names to handlers and executes calls
//!
//! The single place where tool errors are converted into structured
//! outcomes. Nothing a handler does can abort the enclosing conversation;
//! the model sees failures as error tool results and may recover.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{ToolOutcome, ToolSpec};
use crate::tools::handler::{ToolContext, ToolHandler};

/// Ordered set of tool bindings for one agent
#[derive(Default)]
pub struct ToolDispatch {
    /// Handlers in registration order (the order specs are advertised in)
    handlers: Vec<Arc<dyn ToolHandler>>,
    by_name: HashMap<String, usize>,
}

impl ToolDispatch {
    /// Create an empty dispatch table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. Names must be unique within one agent's toolset;
    /// a re-registered name replaces the earlier binding.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        let name = handler.spec().name;
        match self.by_name.get(&name) {
            Some(&index) => self.handlers[index] = handler,
            None => {
                self.by_name.insert(name, self.handlers.len());
                self.handlers.push(handler);
            }
        }
    }

    /// Tool specifications, in registration order
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.handlers.iter().map(|h| h.spec()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no tools are registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Execute a tool call. Never returns an error: unknown names and
    /// handler failures become the `Err` outcome.
    pub async fn execute(
        &self,
        name: &str,
        input: &serde_json::Value,
        ctx: &ToolContext,
    ) -> ToolOutcome {
        let Some(&index) = self.by_name.get(name) else {
            tracing::warn!(tool = name, "unknown tool requested");
            return ToolOutcome::Err(format!("Unknown tool: {}", name));
        };

        match self.handlers[index].execute(input, ctx).await {
            Ok(content) => ToolOutcome::Ok(content),
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool call failed");
                ToolOutcome::Err(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::service::Registry;
    use crate::core::{Config, Result, TroupeError};
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    struct EchoTool;

    #[async_trait]
    impl ToolHandler for EchoTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec::new("echo", "Echoes back the input text", serde_json::json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"]
            }))
        }

        async fn execute(&self, input: &serde_json::Value, _ctx: &ToolContext) -> Result<String> {
            Ok(input["text"].as_str().unwrap_or_default().to_string())
        }
    }

    struct FailingTool;

    #[async_trait]
    impl ToolHandler for FailingTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec::new("always_fails", "Fails", serde_json::json!({"type": "object"}))
        }

        async fn execute(&self, _input: &serde_json::Value, _ctx: &ToolContext) -> Result<String> {
            Err(TroupeError::tool("it broke"))
        }
    }

    fn test_ctx() -> ToolContext {
        let registry = Registry::new(Config::default());
        ToolContext::new(registry, vec!["Test".to_string()], CancellationToken::new())
    }

    #[tokio::test]
    async fn test_unknown_tool_is_err_outcome() {
        let dispatch = ToolDispatch::new();
        let outcome = dispatch
            .execute("nonexistent_tool", &serde_json::json!({}), &test_ctx())
            .await;
        assert_eq!(
            outcome,
            ToolOutcome::Err("Unknown tool: nonexistent_tool".to_string())
        );
    }

    #[tokio::test]
    async fn test_handler_error_is_err_outcome() {
        let mut dispatch = ToolDispatch::new();
        dispatch.register(Arc::new(FailingTool));
        let outcome = dispatch
            .execute("always_fails", &serde_json::json!({}), &test_ctx())
            .await;
        assert!(outcome.is_error());
    }

    #[tokio::test]
    async fn test_execute_ok() {
        let mut dispatch = ToolDispatch::new();
        dispatch.register(Arc::new(EchoTool));
        let outcome = dispatch
            .execute("echo", &serde_json::json!({"text": "hi"}), &test_ctx())
            .await;
        assert_eq!(outcome, ToolOutcome::Ok("hi".to_string()));
    }

    #[test]
    fn test_specs_preserve_registration_order() {
        let mut dispatch = ToolDispatch::new();
        dispatch.register(Arc::new(FailingTool));
        dispatch.register(Arc::new(EchoTool));
        let names: Vec<String> = dispatch.specs().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["always_fails", "echo"]);
    }
}
