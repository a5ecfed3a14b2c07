//! Tool handler trait and per-run tool context
//!
//! Handlers declare their side-effect kind explicitly; file-mutating tools
//! report touched paths through the context rather than in their output, so
//! the conversation loop can aggregate them without parsing tool results.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::agent::service::Registry;
use crate::core::{Result, ToolSpec};

/// Kind of side effect a tool may have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Pure with respect to the workspace
    None,
    /// May create, modify, or delete workspace files
    FileMutation,
}

/// Per-run state passed to every tool invocation.
///
/// Scoped to one conversation loop run; never shared across concurrent runs.
pub struct ToolContext {
    /// Registry used by inter-agent invocation to look up services
    pub registry: Arc<Registry>,
    /// Active invocation path, the running agent last
    pub chain: Vec<String>,
    /// Cancellation signal for the run
    pub cancel: CancellationToken,
    /// Relative paths of files mutated during the run
    modified: Mutex<BTreeSet<String>>,
}

impl ToolContext {
    /// Create a context for one run
    pub fn new(registry: Arc<Registry>, chain: Vec<String>, cancel: CancellationToken) -> Self {
        Self {
            registry,
            chain,
            cancel,
            modified: Mutex::new(BTreeSet::new()),
        }
    }

    /// Record a workspace-relative path as modified by a tool
    pub fn note_modified(&self, path: impl Into<String>) {
        self.modified
            .lock()
            .expect("modified-file set poisoned")
            .insert(path.into());
    }

    /// Reset the modified-file set at run start
    pub fn clear_modified(&self) {
        self.modified
            .lock()
            .expect("modified-file set poisoned")
            .clear();
    }

    /// Consume the accumulated modified-file set at run completion
    pub fn take_modified(&self) -> BTreeSet<String> {
        std::mem::take(
            &mut *self
                .modified
                .lock()
                .expect("modified-file set poisoned"),
        )
    }
}

/// Trait for tools an agent can invoke mid-conversation
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// The specification advertised to the model
    fn spec(&self) -> ToolSpec;

    /// What kind of side effect this tool may have
    fn side_effect(&self) -> SideEffect {
        SideEffect::None
    }

    /// Execute the tool. Errors returned here are converted into
    /// model-visible error tool results at the dispatch boundary and never
    /// abort the run.
    async fn execute(&self, input: &serde_json::Value, ctx: &ToolContext) -> Result<String>;
}

/// Get a required string field from tool input
pub fn require_str<'a>(input: &'a serde_json::Value, key: &str) -> Result<&'a str> {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| crate::core::TroupeError::tool(format!("missing required field '{}'", key)))
}
