//! 编辑工具：字面子串替换
//!
//! 只替换第一处出现；old_string 多次出现时其余保持不变（既定限制，模型提示词依赖此行为）。

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::{Tool, ToolResult};

/// Edit 工具：按字面子串查找并替换第一处
pub struct EditTool;

#[async_trait]
impl Tool for EditTool {
    fn name(&self) -> &str {
        "edit"
    }

    fn description(&self) -> &str {
        "Edit a file by replacing specific text with new text. Use this to modify existing files."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "The path to the file to edit"
                },
                "old_string": {
                    "type": "string",
                    "description": "The exact text to find and replace"
                },
                "new_string": {
                    "type": "string",
                    "description": "The replacement text"
                }
            },
            "required": ["file_path", "old_string", "new_string"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let file_path = match args.get("file_path").and_then(|v| v.as_str()) {
            Some(p) => p,
            None => return ToolResult::fail("Edit", "Error: Missing required parameter: file_path"),
        };
        let title = format!("Edit {}", file_path);
        let old_string = match args.get("old_string").and_then(|v| v.as_str()) {
            Some(s) => s,
            None => return ToolResult::fail(title, "Error: Missing required parameter: old_string"),
        };
        let new_string = match args.get("new_string").and_then(|v| v.as_str()) {
            Some(s) => s,
            None => return ToolResult::fail(title, "Error: Missing required parameter: new_string"),
        };

        tracing::info!(path = %file_path, "edit tool execute");

        let path = Path::new(file_path);
        if !path.exists() {
            return ToolResult::fail(title, format!("Error: File not found: {}", file_path));
        }

        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => return ToolResult::fail(title, format!("Error: {}", e)),
        };
        let content = match String::from_utf8(bytes) {
            Ok(c) => c,
            Err(_) => return ToolResult::fail(title, "Error: Cannot edit binary file"),
        };

        if !content.contains(old_string) {
            return ToolResult::fail(
                title,
                format!("Error: String not found in file.\n\nExpected:\n{}", old_string),
            );
        }

        let new_content = content.replacen(old_string, new_string, 1);
        if let Err(e) = std::fs::write(path, new_content) {
            return ToolResult::fail(title, format!("Error: {}", e));
        }

        ToolResult::ok(
            title,
            format!(
                "Successfully replaced:\n\n---\n{}\n---\n\nwith:\n\n---\n{}\n---",
                old_string, new_string
            ),
        )
    }
}
