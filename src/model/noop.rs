//! Noop backend
//!
//! Echoes the last user text back as the assistant's answer. Useful for
//! wiring tests and offline smoke runs of the service layer.

use async_trait::async_trait;

use crate::core::{ContentBlock, Message, Result, ToolSpec};
use crate::model::backend::{BackendResponse, ModelBackend, TokenUsage};

/// Backend that returns the prompt as-is, without tool use
#[derive(Debug, Default)]
pub struct NoopBackend;

impl NoopBackend {
    /// Create a new noop backend
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModelBackend for NoopBackend {
    async fn complete(
        &self,
        _system: &str,
        messages: &[Message],
        _tools: &[ToolSpec],
    ) -> Result<BackendResponse> {
        let echo = messages
            .iter()
            .rev()
            .flat_map(|m| m.content.iter())
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_default();

        Ok(BackendResponse {
            blocks: vec![ContentBlock::text(echo)],
            usage: TokenUsage::default(),
        })
    }

    fn name(&self) -> &str {
        "noop"
    }
}
