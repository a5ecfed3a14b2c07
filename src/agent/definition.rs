//! Agent identity and construction
//!
//! An agent is a name, a system prompt, an ordered toolset, and a bound
//! model backend. Immutable for its lifetime; built once at process start.

use std::fmt;
use std::sync::Arc;

use crate::core::{Config, Result, ToolSpec, TroupeError};
use crate::model::{create_backend, Msn, ModelBackend, DEFAULT_MSN};
use crate::tools::{ToolDispatch, ToolHandler};

/// An immutable agent definition
pub struct Agent {
    name: String,
    system_prompt: String,
    /// Optional preamble prepended to the first user message of each run
    prompt_preamble: Option<String>,
    dispatch: ToolDispatch,
    backend: Arc<dyn ModelBackend>,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Create a builder for an agent with the given name
    pub fn builder(name: impl Into<String>) -> AgentBuilder {
        AgentBuilder::new(name)
    }

    /// Get the agent's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the agent's system prompt
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Get the agent's tool dispatch table
    pub fn dispatch(&self) -> &ToolDispatch {
        &self.dispatch
    }

    /// Get the agent's model backend
    pub fn backend(&self) -> &Arc<dyn ModelBackend> {
        &self.backend
    }

    /// Tool specifications advertised to the model, in registration order
    pub fn tool_specs(&self) -> Vec<ToolSpec> {
        self.dispatch.specs()
    }

    /// Prepare the initial user message for a run
    pub fn prepare_prompt(&self, prompt: &str) -> String {
        match &self.prompt_preamble {
            Some(preamble) => format!("{}\n{}", preamble, prompt.trim()),
            None => prompt.trim().to_string(),
        }
    }
}

/// Builder for creating agents
pub struct AgentBuilder {
    name: String,
    system_prompt: Option<String>,
    prompt_preamble: Option<String>,
    msn: Option<String>,
    backend: Option<Arc<dyn ModelBackend>>,
    dispatch: ToolDispatch,
}

impl AgentBuilder {
    /// Create a new builder with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_prompt: None,
            prompt_preamble: None,
            msn: None,
            backend: None,
            dispatch: ToolDispatch::new(),
        }
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set a preamble prepended to the first user message of each run
    pub fn prompt_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.prompt_preamble = Some(preamble.into());
        self
    }

    /// Select the model backend by MSN, overriding the configured one
    pub fn msn(mut self, msn: impl Into<String>) -> Self {
        self.msn = Some(msn.into());
        self
    }

    /// Bind an already-constructed backend (takes precedence over MSN)
    pub fn backend(mut self, backend: Arc<dyn ModelBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Register a tool
    pub fn tool(mut self, handler: Arc<dyn ToolHandler>) -> Self {
        self.dispatch.register(handler);
        self
    }

    /// Build the agent, constructing its backend from the MSN if one was
    /// not bound directly
    pub fn build(self, config: &Config) -> Result<Agent> {
        let backend = match self.backend {
            Some(backend) => backend,
            None => {
                let msn_str = self
                    .msn
                    .or_else(|| config.model.msn.clone())
                    .unwrap_or_else(|| DEFAULT_MSN.to_string());
                let msn = Msn::parse(&msn_str)?;
                create_backend(&msn, config)?
            }
        };

        Ok(Agent {
            name: self.name.clone(),
            system_prompt: self.system_prompt.ok_or_else(|| {
                TroupeError::config(format!("agent '{}' has no system prompt", self.name))
            })?,
            prompt_preamble: self.prompt_preamble,
            dispatch: self.dispatch,
            backend,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_system_prompt() {
        let err = Agent::builder("Nameless")
            .msn("noop")
            .build(&Config::default())
            .unwrap_err();
        assert!(err.to_string().contains("no system prompt"));
    }

    #[test]
    fn test_prepare_prompt_with_preamble() {
        let agent = Agent::builder("Coder")
            .system_prompt("You write code.")
            .prompt_preamble("These are all files: a.rs, b.rs.")
            .msn("noop")
            .build(&Config::default())
            .unwrap();

        let prepared = agent.prepare_prompt("  Fix the bug.  ");
        assert_eq!(prepared, "These are all files: a.rs, b.rs.\nFix the bug.");
    }

    #[test]
    fn test_prepare_prompt_without_preamble() {
        let agent = Agent::builder("Coder")
            .system_prompt("You write code.")
            .msn("noop")
            .build(&Config::default())
            .unwrap();
        assert_eq!(agent.prepare_prompt("hello"), "hello");
    }
}
