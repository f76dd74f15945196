//! 写入工具：整文件覆盖

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::{Tool, ToolResult};

/// Write 工具：创建或覆盖文件，必要时自动创建父目录
pub struct WriteTool;

#[async_trait]
impl Tool for WriteTool {
    fn name(&self) -> &str {
        "write"
    }

    fn description(&self) -> &str {
        "Write content to a file. Creates the file if it doesn't exist, overwrites if it does."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "The path to the file to write"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write to the file"
                }
            },
            "required": ["file_path", "content"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let file_path = match args.get("file_path").and_then(|v| v.as_str()) {
            Some(p) => p,
            None => {
                return ToolResult::fail("Write", "Error: Missing required parameter: file_path")
            }
        };
        let content = match args.get("content").and_then(|v| v.as_str()) {
            Some(c) => c,
            None => {
                return ToolResult::fail(
                    format!("Write {}", file_path),
                    "Error: Missing required parameter: content",
                )
            }
        };

        tracing::info!(path = %file_path, bytes = content.len(), "write tool execute");

        let title = format!("Write {}", file_path);
        let path = Path::new(file_path);

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return ToolResult::fail(title, format!("Error: {}", e));
            }
        }

        match std::fs::write(path, content) {
            Ok(()) => {
                let lines = if content.is_empty() {
                    0
                } else {
                    content.matches('\n').count() + 1
                };
                ToolResult::ok(
                    title,
                    format!("Successfully wrote {} lines to {}", lines, file_path),
                )
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                ToolResult::fail(title, format!("Error: Permission denied: {}", file_path))
            }
            Err(e) => ToolResult::fail(title, format!("Error: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("output.txt");

        let result = WriteTool
            .execute(serde_json::json!({
                "file_path": file.to_str().unwrap(),
                "content": "Test content"
            }))
            .await;
        assert!(result.success);
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "Test content");
        assert!(result.output.contains("1 lines"));
    }

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("subdir").join("output.txt");

        let result = WriteTool
            .execute(serde_json::json!({
                "file_path": file.to_str().unwrap(),
                "content": "Test"
            }))
            .await;
        assert!(result.success);
        assert!(file.exists());
    }

    #[tokio::test]
    async fn test_write_empty_reports_zero_lines() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("empty.txt");

        let result = WriteTool
            .execute(serde_json::json!({
                "file_path": file.to_str().unwrap(),
                "content": ""
            }))
            .await;
        assert!(result.success);
        assert!(result.output.contains("0 lines"));
    }
}
