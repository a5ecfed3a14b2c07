//! Inter-agent invocation tool
//!
//! Lets one agent delegate a prompt to another agent by name. The target is
//! looked up (and its service lazily started) in the registry; the call
//! blocks until the target's conversation loop produces a response.
//!
//! Each instance carries the allow list of the agent it is bound to:
//! invocation is deny-by-default, and an empty list permits nothing. The
//! active call chain travels with every request so that re-entering an agent
//! already on the chain fails fast instead of deadlocking on its busy
//! service.

use async_trait::async_trait;

use crate::agent::service::PromptRequest;
use crate::core::{Result, ToolSpec, TroupeError};
use crate::tools::handler::{require_str, ToolContext, ToolHandler};

/// Name the tool is registered under
pub const INVOKE_AGENT_TOOL_NAME: &str = "invoke_agent";

/// Tool that invokes another agent by name and runs it with a given prompt
pub struct InvokeAgentTool {
    /// Agents the bound agent may invoke
    allowed_agents: Vec<String>,
    /// Upper bound on the invocation chain length
    max_call_depth: usize,
}

impl InvokeAgentTool {
    /// Create an invocation tool with the given allow list
    pub fn new(allowed_agents: Vec<String>, max_call_depth: usize) -> Self {
        Self {
            allowed_agents,
            max_call_depth,
        }
    }
}

#[async_trait]
impl ToolHandler for InvokeAgentTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            INVOKE_AGENT_TOOL_NAME,
            "Invokes another agent by name and runs it with a given prompt",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "agent_name": {"type": "string", "description": "Name of the agent to invoke"},
                    "prompt": {"type": "string", "description": "Prompt to run with the agent"}
                },
                "required": ["agent_name", "prompt"]
            }),
        )
    }

    async fn execute(&self, input: &serde_json::Value, ctx: &ToolContext) -> Result<String> {
        let agent_name = require_str(input, "agent_name")?;
        let prompt = require_str(input, "prompt")?;

        if !self.allowed_agents.iter().any(|a| a == agent_name) {
            return Err(TroupeError::permission(format!(
                "Agent '{}' is not in this agent's allow list",
                agent_name
            )));
        }

        if ctx.chain.iter().any(|a| a == agent_name) {
            return Err(TroupeError::CyclicInvocation(format!(
                "{} -> {}",
                ctx.chain.join(" -> "),
                agent_name
            )));
        }

        if ctx.chain.len() >= self.max_call_depth {
            return Err(TroupeError::CyclicInvocation(format!(
                "invocation depth limit ({}) reached at {}",
                self.max_call_depth,
                ctx.chain.join(" -> ")
            )));
        }

        let service = ctx.registry.service(agent_name)?;

        let mut chain = ctx.chain.clone();
        chain.push(agent_name.to_string());

        tracing::info!(
            target_agent = agent_name,
            chain = chain.join(" -> "),
            "invoking agent"
        );

        service
            .send_request(PromptRequest {
                prompt: prompt.to_string(),
                chain,
            })
            .await?;
        service.receive_from().await
    }
}
