//! Glob 工具：按模式查找文件

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::{Tool, ToolResult};

/// Glob 工具：返回 path 下匹配 pattern 的相对路径（排序）；无匹配是成功而非失败
pub struct GlobTool;

#[async_trait]
impl Tool for GlobTool {
    fn name(&self) -> &str {
        "glob"
    }

    fn description(&self) -> &str {
        "Find files matching a glob pattern. Useful for finding all files of a certain type or pattern."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "The glob pattern to match (e.g., '**/*.py', 'src/**/*.ts')"
                },
                "path": {
                    "type": "string",
                    "description": "The directory to search in (defaults to current directory)"
                }
            },
            "required": ["pattern"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let pattern = match args.get("pattern").and_then(|v| v.as_str()) {
            Some(p) => p,
            None => return ToolResult::fail("glob", "Error: Missing required parameter: pattern"),
        };
        let path = args.get("path").and_then(|v| v.as_str()).unwrap_or(".");

        tracing::info!(pattern = %pattern, path = %path, "glob tool execute");

        let title = format!("glob: {}", pattern);
        let search_path = Path::new(path);
        let search_path = match search_path.canonicalize() {
            Ok(p) => p,
            Err(e) => return ToolResult::fail(title, format!("Error: {}", e)),
        };

        let full_pattern = search_path.join(pattern);
        let full_pattern = full_pattern.to_string_lossy();
        let entries = match glob::glob(&full_pattern) {
            Ok(e) => e,
            Err(e) => return ToolResult::fail(title, format!("Error: {}", e)),
        };

        let mut files: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|p| {
                p.strip_prefix(&search_path)
                    .map(|rel| rel.to_string_lossy().to_string())
                    .ok()
            })
            .collect();

        if files.is_empty() {
            return ToolResult::ok(title, "No files found");
        }

        files.sort();
        ToolResult::ok(
            format!("glob: {} ({} files)", pattern, files.len()),
            files.join("\n"),
        )
    }
}
