//! 读取工具：文件内容或目录列表

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::tools::{Tool, ToolResult};

/// Read 工具：读文件（支持 offset/limit）或列目录（目录名加 / 后缀）
pub struct ReadTool;

impl ReadTool {
    fn read_directory(path: &Path, file_path: &str) -> ToolResult {
        let title = format!("Read {}", file_path);
        let entries = match std::fs::read_dir(path) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return ToolResult::fail(title, format!("Error: Permission denied: {}", file_path));
            }
            Err(e) => return ToolResult::fail(title, format!("Error: {}", e)),
        };

        let mut names: Vec<String> = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            names.push(if is_dir { format!("{}/", name) } else { name });
        }
        names.sort();
        ToolResult::ok(title, names.join("\n"))
    }

    fn read_file(path: &Path, file_path: &str, offset: usize, limit: Option<usize>) -> ToolResult {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return ToolResult::fail(
                    format!("Read {}", file_path),
                    format!("Error: Permission denied: {}", file_path),
                );
            }
            Err(e) => {
                return ToolResult::fail(format!("Read {}", file_path), format!("Error: {}", e));
            }
        };
        let size = bytes.len();
        let text = match String::from_utf8(bytes) {
            Ok(t) => t,
            Err(_) => {
                return ToolResult::fail(
                    format!("Read {}", file_path),
                    "Error: Cannot read binary file",
                );
            }
        };

        let mut lines: Vec<&str> = text.lines().collect();
        if offset > 0 {
            lines = lines.into_iter().skip(offset).collect();
        }
        if let Some(limit) = limit {
            lines.truncate(limit);
        }

        let title = format!("Read {} ({} lines, {} bytes)", file_path, lines.len(), size);
        ToolResult::ok(title, lines.join("\n"))
    }
}

#[async_trait]
impl Tool for ReadTool {
    fn name(&self) -> &str {
        "read"
    }

    fn description(&self) -> &str {
        "Read the contents of a file or directory. Use this to read files to understand code."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "The absolute or relative path to the file or directory to read"
                },
                "offset": {
                    "type": "integer",
                    "description": "Line offset to start reading from"
                },
                "limit": {
                    "type": "integer",
                    "description": "Number of lines to read"
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let file_path = match args.get("file_path").and_then(|v| v.as_str()) {
            Some(p) => p,
            None => return ToolResult::fail("Read", "Error: Missing required parameter: file_path"),
        };
        let offset = args
            .get("offset")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(0);
        let limit = args
            .get("limit")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize);

        tracing::info!(path = %file_path, "read tool execute");

        let path = Path::new(file_path);
        if !path.exists() {
            return ToolResult::fail(
                format!("Read {}", file_path),
                format!("Error: File not found: {}", file_path),
            );
        }

        if path.is_dir() {
            Self::read_directory(path, file_path)
        } else {
            Self::read_file(path, file_path, offset, limit)
        }
    }
}
