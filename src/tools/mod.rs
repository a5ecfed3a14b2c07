//! Tools module - handlers, dispatch, and the built-in tool set

pub mod ask_user;
pub mod dispatch;
pub mod exec;
pub mod fs;
pub mod handler;
pub mod invoke_agent;

pub use ask_user::AskUserTool;
pub use dispatch::ToolDispatch;
pub use exec::{ApprovedCommands, ExecTool};
pub use fs::{DeleteFileTool, ReadFileTool, ReplaceInFileTool, WriteFileTool};
pub use handler::{SideEffect, ToolContext, ToolHandler};
pub use invoke_agent::{InvokeAgentTool, INVOKE_AGENT_TOOL_NAME};
