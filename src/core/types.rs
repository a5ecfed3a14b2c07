//! Shared types used across Troupe modules
//!
//! Contains the conversation message structures, the closed content-block
//! union forming the tool-call wire protocol, and tool specifications.

use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A message in a conversation: a role and an ordered sequence of
/// content blocks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a user message from content blocks
    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    /// Create a user message holding a single text block
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![ContentBlock::text(text)])
    }

    /// Create an assistant message from content blocks
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }
}

/// A content block in the vendor-agnostic tool-call protocol.
///
/// This is the closed set the engine operates on; vendor wire formats are
/// translated into it at the backend boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Assistant-visible text
    Text { text: String },
    /// The model requests a tool invocation
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// The result of a tool invocation, paired to a ToolUse by id
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "is_false")]
        is_error: bool,
    },
    /// A terminal error surfaced by the model backend inside a turn
    Error { text: String },
}

fn is_false(b: &bool) -> bool {
    !b
}

impl ContentBlock {
    /// Create a text block
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a tool use block
    pub fn tool_use(
        id: impl Into<String>,
        name: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        Self::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Create a successful tool result block
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Create an error tool result block
    pub fn tool_error(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

/// Specification of a tool exposed to the model: name, description, and a
/// JSON Schema for the accepted input. Immutable, created at agent
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

impl ToolSpec {
    /// Create a new tool specification
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Outcome of dispatching one tool call. Errors never cross the dispatch
/// boundary as errors; they become the `Err` variant, which the model sees
/// as an error tool result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    Ok(String),
    Err(String),
}

impl ToolOutcome {
    /// Whether this outcome is the error variant
    pub fn is_error(&self) -> bool {
        matches!(self, ToolOutcome::Err(_))
    }

    /// Wrap the outcome as a tool result block paired to the given tool use
    pub fn into_block(self, tool_use_id: &str) -> ContentBlock {
        match self {
            ToolOutcome::Ok(content) => ContentBlock::tool_result(tool_use_id, content),
            ToolOutcome::Err(message) => ContentBlock::tool_error(tool_use_id, message),
        }
    }
}
