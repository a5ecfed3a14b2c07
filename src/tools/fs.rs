//! File tools - read, write, replace, delete within a workspace root
//!
//! Paths are workspace-relative; mutating tools report touched paths into
//! the run's modified-file set through the tool context.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::core::{Result, ToolSpec, TroupeError};
use crate::tools::handler::{require_str, SideEffect, ToolContext, ToolHandler};

/// Resolve a workspace-relative path, rejecting absolute paths and parent
/// traversal
fn resolve(root: &Path, relative: &str) -> Result<PathBuf> {
    let candidate = Path::new(relative);
    if candidate.is_absolute() {
        return Err(TroupeError::tool(format!(
            "path '{}' must be relative to the workspace",
            relative
        )));
    }
    if candidate
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(TroupeError::tool(format!(
            "path '{}' may not leave the workspace",
            relative
        )));
    }
    Ok(root.join(candidate))
}

/// Tool that reads a file's contents
pub struct ReadFileTool {
    root: PathBuf,
}

impl ReadFileTool {
    /// Create a read tool rooted at the given workspace directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ToolHandler for ReadFileTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "read_file",
            "Read the contents of a file in the workspace",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Workspace-relative path of the file to read"}
                },
                "required": ["path"]
            }),
        )
    }

    async fn execute(&self, input: &serde_json::Value, _ctx: &ToolContext) -> Result<String> {
        let path = require_str(input, "path")?;
        let full = resolve(&self.root, path)?;
        fs::read_to_string(&full)
            .await
            .map_err(|e| TroupeError::tool(format!("failed to read '{}': {}", path, e)))
    }
}

/// Tool that writes (creates or overwrites) a file
pub struct WriteFileTool {
    root: PathBuf,
}

impl WriteFileTool {
    /// Create a write tool rooted at the given workspace directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ToolHandler for WriteFileTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "write_file",
            "Write content to a file in the workspace, creating it if needed",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Workspace-relative path of the file to write"},
                    "content": {"type": "string", "description": "Full new contents of the file"}
                },
                "required": ["path", "content"]
            }),
        )
    }

    fn side_effect(&self) -> SideEffect {
        SideEffect::FileMutation
    }

    async fn execute(&self, input: &serde_json::Value, ctx: &ToolContext) -> Result<String> {
        let path = require_str(input, "path")?;
        let content = require_str(input, "content")?;
        let full = resolve(&self.root, path)?;

        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&full, content)
            .await
            .map_err(|e| TroupeError::tool(format!("failed to write '{}': {}", path, e)))?;

        ctx.note_modified(path);
        Ok(format!("Wrote {} bytes to {}", content.len(), path))
    }
}

/// Tool that replaces the first occurrence of a string in a file
pub struct ReplaceInFileTool {
    root: PathBuf,
}

impl ReplaceInFileTool {
    /// Create a replace tool rooted at the given workspace directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ToolHandler for ReplaceInFileTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "replace_in_file",
            "Replace the first occurrence of a string in a file",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Workspace-relative path of the file to edit"},
                    "search": {"type": "string", "description": "Exact text to find"},
                    "replace": {"type": "string", "description": "Text to substitute for the match"}
                },
                "required": ["path", "search", "replace"]
            }),
        )
    }

    fn side_effect(&self) -> SideEffect {
        SideEffect::FileMutation
    }

    async fn execute(&self, input: &serde_json::Value, ctx: &ToolContext) -> Result<String> {
        let path = require_str(input, "path")?;
        let search = require_str(input, "search")?;
        let replace = require_str(input, "replace")?;
        let full = resolve(&self.root, path)?;

        let content = fs::read_to_string(&full)
            .await
            .map_err(|e| TroupeError::tool(format!("failed to read '{}': {}", path, e)))?;

        if !content.contains(search) {
            return Err(TroupeError::tool(format!(
                "search text not found in '{}'",
                path
            )));
        }

        let updated = content.replacen(search, replace, 1);
        fs::write(&full, updated)
            .await
            .map_err(|e| TroupeError::tool(format!("failed to write '{}': {}", path, e)))?;

        ctx.note_modified(path);
        Ok(format!("Replaced text in {}", path))
    }
}

/// Tool that deletes a file
pub struct DeleteFileTool {
    root: PathBuf,
}

impl DeleteFileTool {
    /// Create a delete tool rooted at the given workspace directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ToolHandler for DeleteFileTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "delete_file",
            "Delete a file from the workspace",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string", "description": "Workspace-relative path of the file to delete"}
                },
                "required": ["path"]
            }),
        )
    }

    fn side_effect(&self) -> SideEffect {
        SideEffect::FileMutation
    }

    async fn execute(&self, input: &serde_json::Value, ctx: &ToolContext) -> Result<String> {
        let path = require_str(input, "path")?;
        let full = resolve(&self.root, path)?;
        fs::remove_file(&full)
            .await
            .map_err(|e| TroupeError::tool(format!("failed to delete '{}': {}", path, e)))?;

        ctx.note_modified(path);
        Ok(format!("Deleted {}", path))
    }
}
