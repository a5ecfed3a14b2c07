//! Command execution tool with a confirmation cache
//!
//! Commands are confirmed with the user before first execution; approvals
//! are remembered for the process lifetime in an explicit, mutex-guarded
//! set shared across agents.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::process::Command;

use crate::core::{Result, ToolSpec, TroupeError};
use crate::tools::ask_user::prompt_user;
use crate::tools::handler::{require_str, ToolContext, ToolHandler};

/// Process-wide set of commands the user has already approved
#[derive(Debug, Default)]
pub struct ApprovedCommands {
    commands: Mutex<HashSet<String>>,
}

impl ApprovedCommands {
    /// Create an empty approval set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a command has been approved before
    pub fn is_approved(&self, command: &str) -> bool {
        self.commands
            .lock()
            .expect("approved-commands set poisoned")
            .contains(command)
    }

    /// Remember a command as approved
    pub fn approve(&self, command: impl Into<String>) {
        self.commands
            .lock()
            .expect("approved-commands set poisoned")
            .insert(command.into());
    }
}

/// Tool that executes a shell command in the workspace
pub struct ExecTool {
    workspace: PathBuf,
    approvals: Arc<ApprovedCommands>,
    /// Skip the interactive confirmation (non-interactive runs)
    auto_approve: bool,
}

impl ExecTool {
    /// Create an exec tool sharing the given approval set
    pub fn new(
        workspace: impl Into<PathBuf>,
        approvals: Arc<ApprovedCommands>,
        auto_approve: bool,
    ) -> Self {
        Self {
            workspace: workspace.into(),
            approvals,
            auto_approve,
        }
    }
}

#[async_trait]
impl ToolHandler for ExecTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "exec",
            "Execute a command in the terminal",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "command": {"type": "string", "description": "The command to execute"}
                },
                "required": ["command"]
            }),
        )
    }

    async fn execute(&self, input: &serde_json::Value, _ctx: &ToolContext) -> Result<String> {
        let command = require_str(input, "command")?.to_string();

        if !self.auto_approve && !self.approvals.is_approved(&command) {
            let answer = prompt_user(&format!(
                "Do you want to execute the following command? [Y/n]\n{}",
                command
            ))
            .await?;
            if !answer.is_empty() && !answer.eq_ignore_ascii_case("y") {
                return Err(TroupeError::tool("Command execution cancelled by user."));
            }
            self.approvals.approve(command.clone());
        }

        let output = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .current_dir(&self.workspace)
            .output()
            .await
            .map_err(|e| TroupeError::tool(format!("failed to spawn '{}': {}", command, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(TroupeError::tool(format!(
                "Command failed with {}.\nCommand: {}\nStdout: {}\nStderr: {}",
                output.status, command, stdout, stderr
            )));
        }

        Ok(format!("stdout={}\nstderr={}", stdout, stderr))
    }
}
