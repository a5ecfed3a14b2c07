//! End-to-end tests of the service layer: queue ordering, inter-agent
//! delegation, permission checks, and the cyclic-invocation guard.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use troupe::agent::{Agent, Registry};
use troupe::core::{Config, ContentBlock, Message, ToolSpec, TroupeError};
use troupe::model::{BackendResponse, ModelBackend, TokenUsage};
use troupe::tools::InvokeAgentTool;

/// Backend that replays a fixed sequence of assistant turns and records the
/// conversation it was shown on each call
struct ScriptedBackend {
    turns: Mutex<VecDeque<Vec<ContentBlock>>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedBackend {
    fn new(turns: Vec<Vec<ContentBlock>>) -> Arc<Self> {
        Arc::new(Self {
            turns: Mutex::new(turns.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Tool results the model saw on its nth call
    fn tool_results_of_call(&self, n: usize) -> Vec<(String, bool)> {
        let calls = self.calls.lock().unwrap();
        calls[n]
            .last()
            .unwrap()
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolResult {
                    content, is_error, ..
                } => Some((content.clone(), *is_error)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn complete(
        &self,
        _system: &str,
        messages: &[Message],
        _tools: &[ToolSpec],
    ) -> troupe::Result<BackendResponse> {
        self.calls.lock().unwrap().push(messages.to_vec());
        let blocks = self
            .turns
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TroupeError::backend("script exhausted"))?;
        Ok(BackendResponse {
            blocks,
            usage: TokenUsage::default(),
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn invoke_block(id: &str, agent_name: &str, prompt: &str) -> ContentBlock {
    ContentBlock::tool_use(
        id,
        "invoke_agent",
        serde_json::json!({"agent_name": agent_name, "prompt": prompt}),
    )
}

fn noop_agent(name: &str, config: &Config) -> Agent {
    Agent::builder(name)
        .system_prompt("Echo agent.")
        .msn("noop")
        .build(config)
        .unwrap()
}

#[tokio::test]
async fn fifo_ordering_across_one_service() {
    let config = Config::default();
    let registry = Registry::new(config.clone());
    registry.register(noop_agent("Echo", &config));
    let service = registry.service("Echo").unwrap();

    service.send_to("P1").await.unwrap();
    service.send_to("P2").await.unwrap();

    let r1 = timeout(Duration::from_secs(5), service.receive_from())
        .await
        .unwrap()
        .unwrap();
    let r2 = timeout(Duration::from_secs(5), service.receive_from())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(r1, "P1");
    assert_eq!(r2, "P2");

    registry.shutdown();
}

#[tokio::test]
async fn delegation_round_trip() {
    let config = Config::default();

    // The manager invokes the echo agent, then reports its answer.
    let manager_backend = ScriptedBackend::new(vec![
        vec![invoke_block("id-1", "Echo", "ping")],
        vec![ContentBlock::text("echo said ping")],
    ]);

    let registry = Registry::new(config.clone());
    registry.register(
        Agent::builder("Manager")
            .system_prompt("Delegate everything.")
            .backend(manager_backend.clone())
            .tool(Arc::new(InvokeAgentTool::new(vec!["Echo".to_string()], 8)))
            .build(&config)
            .unwrap(),
    );
    registry.register(noop_agent("Echo", &config));

    let manager = registry.service("Manager").unwrap();
    manager.send_to("go").await.unwrap();
    let response = timeout(Duration::from_secs(5), manager.receive_from())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response, "echo said ping");

    // The echo agent's answer came back as the tool result.
    let results = manager_backend.tool_results_of_call(1);
    assert_eq!(results, vec![("ping".to_string(), false)]);

    registry.shutdown();
}

#[tokio::test]
async fn disallowed_invocation_is_recoverable() {
    let config = Config::default();

    let backend = ScriptedBackend::new(vec![
        vec![invoke_block("id-1", "Echo", "ping")],
        vec![ContentBlock::text("could not delegate")],
    ]);

    let registry = Registry::new(config.clone());
    registry.register(
        Agent::builder("Lonely")
            .system_prompt("You may invoke nobody.")
            .backend(backend.clone())
            // Deny-by-default: an empty allow list permits nothing.
            .tool(Arc::new(InvokeAgentTool::new(vec![], 8)))
            .build(&config)
            .unwrap(),
    );
    registry.register(noop_agent("Echo", &config));

    let lonely = registry.service("Lonely").unwrap();
    lonely.send_to("go").await.unwrap();
    let response = timeout(Duration::from_secs(5), lonely.receive_from())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response, "could not delegate");

    let results = backend.tool_results_of_call(1);
    assert_eq!(results.len(), 1);
    let (content, is_error) = &results[0];
    assert!(is_error);
    assert!(content.contains("not in this agent's allow list"));

    registry.shutdown();
}

#[tokio::test]
async fn cyclic_invocation_fails_fast_instead_of_deadlocking() {
    let config = Config::default();

    // A invokes B; B tries to invoke A back, which would deadlock both
    // services without the chain guard.
    let backend_a = ScriptedBackend::new(vec![
        vec![invoke_block("a-1", "B", "over to you")],
        vec![ContentBlock::text("a-done")],
    ]);
    let backend_b = ScriptedBackend::new(vec![
        vec![invoke_block("b-1", "A", "back at you")],
        vec![ContentBlock::text("b-stopped")],
    ]);

    let registry = Registry::new(config.clone());
    registry.register(
        Agent::builder("A")
            .system_prompt("Agent A.")
            .backend(backend_a.clone())
            .tool(Arc::new(InvokeAgentTool::new(vec!["B".to_string()], 8)))
            .build(&config)
            .unwrap(),
    );
    registry.register(
        Agent::builder("B")
            .system_prompt("Agent B.")
            .backend(backend_b.clone())
            .tool(Arc::new(InvokeAgentTool::new(vec!["A".to_string()], 8)))
            .build(&config)
            .unwrap(),
    );

    let a = registry.service("A").unwrap();
    a.send_to("start").await.unwrap();

    // The whole exchange terminates rather than hanging.
    let response = timeout(Duration::from_secs(5), a.receive_from())
        .await
        .expect("cyclic invocation must not hang")
        .unwrap();
    assert_eq!(response, "a-done");

    // B saw the cycle as an error tool result and recovered.
    let results = backend_b.tool_results_of_call(1);
    assert_eq!(results.len(), 1);
    let (content, is_error) = &results[0];
    assert!(is_error);
    assert!(content.contains("Cyclic invocation"));
    assert!(content.contains("A -> B -> A"));

    // A received B's recovery text as its tool result.
    let results = backend_a.tool_results_of_call(1);
    assert_eq!(results, vec![("b-stopped".to_string(), false)]);

    registry.shutdown();
}

#[tokio::test]
async fn call_depth_limit_bounds_delegation() {
    let mut config = Config::default();
    config.service.max_call_depth = 1;

    let backend = ScriptedBackend::new(vec![
        vec![invoke_block("id-1", "Echo", "ping")],
        vec![ContentBlock::text("depth limited")],
    ]);
    let echo_backend = ScriptedBackend::new(vec![]);

    let registry = Registry::new(config.clone());
    registry.register(
        Agent::builder("Root")
            .system_prompt("Delegate.")
            .backend(backend.clone())
            .tool(Arc::new(InvokeAgentTool::new(vec!["Echo".to_string()], 1)))
            .build(&config)
            .unwrap(),
    );
    registry.register(
        Agent::builder("Echo")
            .system_prompt("Echo agent.")
            .backend(echo_backend.clone())
            .build(&config)
            .unwrap(),
    );

    let root = registry.service("Root").unwrap();
    root.send_to("go").await.unwrap();
    let response = timeout(Duration::from_secs(5), root.receive_from())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response, "depth limited");

    // The invocation was refused before the target agent ever ran.
    assert_eq!(echo_backend.call_count(), 0);
    let results = backend.tool_results_of_call(1);
    assert!(results[0].1);
    assert!(results[0].0.contains("depth limit"));

    registry.shutdown();
}
