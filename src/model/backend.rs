//! Model backend trait for abstracting different services
//!
//! A backend consumes the full conversation and produces one assistant turn
//! translated into the engine's closed content-block set. Vendor streaming
//! protocols, if any, are an adapter concern behind this seam.

use std::fmt;

use async_trait::async_trait;

use crate::core::{ContentBlock, Message, Result, ToolSpec};

/// Token usage reported for one backend call
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Total tokens consumed by the call
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// One assistant turn from a model backend
#[derive(Debug, Clone)]
pub struct BackendResponse {
    /// Assistant content blocks, in emission order
    pub blocks: Vec<ContentBlock>,
    /// Token usage for this call
    pub usage: TokenUsage,
}

/// Trait for model backends
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Run one turn: the full conversation, the agent's system prompt, and
    /// its tool specifications go out; one assistant turn comes back.
    ///
    /// Errors from this call are fatal to the run and are never retried.
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<BackendResponse>;

    /// Get the backend service name
    fn name(&self) -> &str;
}

impl fmt::Debug for dyn ModelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBackend")
            .field("name", &self.name())
            .finish()
    }
}
