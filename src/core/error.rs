//! Custom error types for Troupe
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for Troupe operations
#[derive(Error, Debug)]
pub enum TroupeError {
    /// Model backend call failures (auth, network, malformed request).
    /// Fatal to the run and never retried.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Tool execution errors. Recovered at the dispatch boundary and
    /// surfaced to the model as an error tool result.
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Inter-agent invocation of an agent outside the allow list
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Inter-agent invocation that would re-enter an agent already in the
    /// active call chain, or exceed the chain depth bound
    #[error("Cyclic invocation: {0}")]
    CyclicInvocation(String),

    /// MSN named a model service that is not registered
    #[error("Unknown model service: '{0}'")]
    UnknownService(String),

    /// MSN flag segment without a `key=value` shape
    #[error("Malformed MSN flag: '{0}' (expected key=value)")]
    MalformedFlag(String),

    /// No agent registered under the requested name
    #[error("Agent '{0}' not found")]
    UnknownAgent(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A service queue was closed while sending or receiving
    #[error("Agent service '{0}' is no longer running")]
    QueueClosed(String),

    /// A bounded service queue was full under the reject overflow policy
    #[error("Agent service '{0}' inbound queue is full")]
    QueueFull(String),

    /// The run was cancelled cooperatively
    #[error("Run cancelled")]
    Cancelled,

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for Troupe operations
pub type Result<T> = std::result::Result<T, TroupeError>;

impl TroupeError {
    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Create a tool execution error
    pub fn tool(msg: impl Into<String>) -> Self {
        Self::ToolExecution(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a permission error
    pub fn permission(msg: impl Into<String>) -> Self {
        Self::Permission(msg.into())
    }
}
