//! Ask-user tool - lets an agent put a question to the human operator

use async_trait::async_trait;
use std::io::{BufRead, Write};

use crate::core::{Result, ToolSpec, TroupeError};
use crate::tools::handler::{require_str, ToolContext, ToolHandler};

/// Print a question and read one line from stdin without blocking the
/// runtime
pub async fn prompt_user(question: &str) -> Result<String> {
    let question = question.to_string();
    tokio::task::spawn_blocking(move || {
        let mut stdout = std::io::stdout();
        writeln!(stdout, "{}", question)?;
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim().to_string())
    })
    .await
    .map_err(|e| TroupeError::tool(format!("stdin task failed: {}", e)))?
}

/// Tool that asks the user a question and returns their answer
#[derive(Debug, Default)]
pub struct AskUserTool;

impl AskUserTool {
    /// Create a new ask-user tool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ToolHandler for AskUserTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "ask_user",
            "Ask the user a question and wait for their answer",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "question": {"type": "string", "description": "The question to put to the user"}
                },
                "required": ["question"]
            }),
        )
    }

    async fn execute(&self, input: &serde_json::Value, _ctx: &ToolContext) -> Result<String> {
        let question = require_str(input, "question")?;
        prompt_user(question).await
    }
}
