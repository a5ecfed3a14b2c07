//! Built-in agent roster
//!
//! The stock team: a manager that delegates, a planner that breaks work
//! down, a code analyst, a coder with the file tools, and a debugger that
//! runs tests and commands. Each agent carries an explicit allow list for
//! inter-agent invocation; an empty list means it may invoke nobody.

use std::sync::Arc;

use crate::agent::definition::Agent;
use crate::agent::service::Registry;
use crate::core::{Config, Result};
use crate::tools::{
    ApprovedCommands, AskUserTool, DeleteFileTool, ExecTool, InvokeAgentTool, ReadFileTool,
    ReplaceInFileTool, WriteFileTool,
};

const MANAGER_PROMPT: &str = "\
1. You are the Manager, a high-level agent capable of delegating tasks and coordinating other agents.
2. Prefix negative responses with \"NO:\". Prefix responses that indicate a significant success with \"OK:\". Don't prefix neutral responses.
3. Use tools only if necessary.
4. If you have low confidence in a response or don't understand an instruction, explain why and use the ask_user tool to gather clarifications.
5. For simple, straightforward coding tasks, delegate directly to the Coder agent.";

const PLANNER_PROMPT: &str = "\
1. You are the Planner agent.
2. You convert high-level user tasks into small, specific engineering tasks for other agents to carry out.
3. You communicate with the user on interface design questions whenever there are gaps.
4. You are always suspicious that requirements are incomplete, and look for proof of completeness before concluding.
5. When breaking down tasks, group related changes to minimize redundant work by the Coder.";

const CODE_ANALYST_PROMPT: &str = "\
1. You are the CodeAnalyst agent, responsible for deep code analysis and understanding.
2. Use tools to provide comprehensive insights about the codebase.
3. Focus on identifying code locations that require changes or investigation, based on the given requirements.
4. Present your findings in a structured format that other agents can parse and use.";

const CODER_PROMPT: &str = "\
1. You are the Coder, a programming agent who implements code changes based on very clear specifications.
2. Only change the functions, classes, or other code specifically mentioned in the specs.
3. Use tools only if necessary.
4. Don't retry failed commands.
5. Don't make whitespace-only changes to files.
6. If you need clarification on implementation details, use the ask_user tool to ask the user directly.";

const DEBUGGER_PROMPT: &str = "\
1. You are the Debugger, an agent responsible for running tests and executing commands.
2. Use the exec tool to run tests and commands when necessary.
3. Report test results and execution outputs clearly and concisely.
4. If a test fails or a command errors, provide detailed information about the failure.
5. Suggest potential fixes or next steps based on the outputs, and report recurring issues back to the Coder.";

/// Build a registry populated with the stock agent roster
pub fn default_registry(config: &Config) -> Result<Arc<Registry>> {
    let registry = Registry::new(config.clone());
    let approvals = Arc::new(ApprovedCommands::new());

    for agent in build_roster(config, &approvals)? {
        registry.register(agent);
    }

    Ok(registry)
}

fn build_roster(config: &Config, approvals: &Arc<ApprovedCommands>) -> Result<Vec<Agent>> {
    let root = &config.workspace.root;
    let depth = config.service.max_call_depth;

    let manager = Agent::builder("Manager")
        .system_prompt(MANAGER_PROMPT)
        .tool(Arc::new(InvokeAgentTool::new(
            vec!["Planner".to_string(), "Coder".to_string()],
            depth,
        )))
        .tool(Arc::new(AskUserTool::new()))
        .build(config)?;

    let planner = Agent::builder("Planner")
        .system_prompt(PLANNER_PROMPT)
        .tool(Arc::new(AskUserTool::new()))
        .tool(Arc::new(InvokeAgentTool::new(
            vec!["CodeAnalyst".to_string()],
            depth,
        )))
        .build(config)?;

    let code_analyst = Agent::builder("CodeAnalyst")
        .system_prompt(CODE_ANALYST_PROMPT)
        .tool(Arc::new(ReadFileTool::new(root)))
        .build(config)?;

    let coder = Agent::builder("Coder")
        .system_prompt(CODER_PROMPT)
        .tool(Arc::new(ReadFileTool::new(root)))
        .tool(Arc::new(WriteFileTool::new(root)))
        .tool(Arc::new(ReplaceInFileTool::new(root)))
        .tool(Arc::new(DeleteFileTool::new(root)))
        .tool(Arc::new(AskUserTool::new()))
        .build(config)?;

    let debugger = Agent::builder("Debugger")
        .system_prompt(DEBUGGER_PROMPT)
        .tool(Arc::new(ExecTool::new(
            root,
            approvals.clone(),
            config.workspace.auto_approve_commands,
        )))
        .tool(Arc::new(InvokeAgentTool::new(
            vec!["Coder".to_string()],
            depth,
        )))
        .build(config)?;

    Ok(vec![manager, planner, code_analyst, coder, debugger])
}
