//! Conversation loop - the per-run turn-taking state machine
//!
//! Alternates model calls and tool dispatch until the model produces a turn
//! with no tool use. Tool calls within a turn are dispatched sequentially,
//! in emission order, and every tool use is answered by exactly one tool
//! result before the next model call.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::agent::definition::Agent;
use crate::agent::rate_limit::RateLimiter;
use crate::core::{Config, ContentBlock, Message, Result, TroupeError};
use crate::tools::ToolContext;

/// Completion boundary: receives the run's side-effect summary once the
/// model has said its final piece. The diff/apply confirmation flow lives
/// behind this trait, outside the engine.
pub trait CompletionHandler: Send + Sync {
    fn on_complete(&self, agent_name: &str, had_any_text: bool, modified_files: &BTreeSet<String>);
}

/// Default completion handler: reports modified files
#[derive(Debug, Default)]
pub struct ReportCompletion;

impl CompletionHandler for ReportCompletion {
    fn on_complete(&self, agent_name: &str, had_any_text: bool, modified_files: &BTreeSet<String>) {
        if !had_any_text {
            println!("[{}] Done.", agent_name);
        }
        if !modified_files.is_empty() {
            let files: Vec<&str> = modified_files.iter().map(String::as_str).collect();
            println!("[{}] Modified files: {}", agent_name, files.join(", "));
        }
    }
}

/// A tool call queued while scanning one assistant turn
struct PendingToolUse {
    id: String,
    name: String,
    input: serde_json::Value,
}

/// What one assistant turn asks the loop to do next
enum TurnAction {
    /// Tool uses were emitted; dispatch them and go back to the model
    Dispatch(Vec<PendingToolUse>),
    /// No tool use this turn; the model has said its final piece
    Complete,
    /// The turn carried a terminal error block
    Abort(String),
}

/// Drives one agent's conversation for a single prompt
pub struct ConversationLoop {
    agent: Arc<Agent>,
    limiter: RateLimiter,
    completion: Arc<dyn CompletionHandler>,
}

impl ConversationLoop {
    /// Create a loop for one run with the default completion handler
    pub fn new(agent: Arc<Agent>, config: &Config) -> Self {
        Self::with_completion(agent, config, Arc::new(ReportCompletion))
    }

    /// Create a loop with a custom completion handler
    pub fn with_completion(
        agent: Arc<Agent>,
        config: &Config,
        completion: Arc<dyn CompletionHandler>,
    ) -> Self {
        Self {
            agent,
            limiter: RateLimiter::new(config.limits.tokens_per_minute),
            completion,
        }
    }

    /// Run the conversation to completion and return the final answer.
    ///
    /// Backend failures abort the run and are never retried; tool failures
    /// are folded back into the conversation as error tool results.
    pub async fn run(&mut self, prompt: &str, ctx: &ToolContext) -> Result<String> {
        ctx.clear_modified();

        let prepared = self.agent.prepare_prompt(prompt);
        let specs = self.agent.tool_specs();
        let mut conversation = vec![Message::user_text(prepared)];

        let mut had_any_text = false;
        let mut final_text = String::new();

        loop {
            if ctx.cancel.is_cancelled() {
                return Err(TroupeError::Cancelled);
            }

            self.limiter.check_and_wait().await;

            let response = self
                .agent
                .backend()
                .complete(self.agent.system_prompt(), &conversation, &specs)
                .await?;
            self.limiter
                .record(response.usage.input_tokens, response.usage.output_tokens);

            let action = self.process_turn(&response.blocks, &mut had_any_text, &mut final_text)?;

            match action {
                TurnAction::Abort(text) => {
                    tracing::error!(agent = self.agent.name(), error = %text, "run aborted by model");
                    return Ok(text);
                }
                TurnAction::Complete => {
                    let modified = ctx.take_modified();
                    self.completion
                        .on_complete(self.agent.name(), had_any_text, &modified);

                    let (input, output) = self.limiter.totals();
                    tracing::debug!(
                        agent = self.agent.name(),
                        input_tokens = input,
                        output_tokens = output,
                        "run complete"
                    );
                    return Ok(final_text);
                }
                TurnAction::Dispatch(pending) => {
                    let mut results = Vec::with_capacity(pending.len());
                    for call in &pending {
                        let outcome = self
                            .agent
                            .dispatch()
                            .execute(&call.name, &call.input, ctx)
                            .await;
                        results.push(outcome.into_block(&call.id));
                    }

                    conversation.push(Message::assistant(response.blocks));
                    conversation.push(Message::user(results));
                }
            }
        }
    }

    /// Scan one assistant turn's blocks in order: text becomes the
    /// provisional final answer (last one wins) and is surfaced
    /// immediately; tool uses are queued for dispatch; an error block is
    /// terminal.
    fn process_turn(
        &self,
        blocks: &[ContentBlock],
        had_any_text: &mut bool,
        final_text: &mut String,
    ) -> Result<TurnAction> {
        let mut pending = Vec::new();

        for block in blocks {
            match block {
                ContentBlock::Text { text } => {
                    *had_any_text = true;
                    *final_text = text.clone();
                    println!("[{}] {}", self.agent.name(), text);
                }
                ContentBlock::ToolUse { id, name, input } => {
                    tracing::debug!(agent = self.agent.name(), tool = %name, "tool use requested");
                    pending.push(PendingToolUse {
                        id: id.clone(),
                        name: name.clone(),
                        input: input.clone(),
                    });
                }
                ContentBlock::Error { text } => {
                    return Ok(TurnAction::Abort(text.clone()));
                }
                ContentBlock::ToolResult { .. } => {
                    return Err(TroupeError::backend(
                        "assistant turn contained a tool_result block",
                    ));
                }
            }
        }

        if pending.is_empty() {
            Ok(TurnAction::Complete)
        } else {
            Ok(TurnAction::Dispatch(pending))
        }
    }
}
