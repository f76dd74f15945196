//! Grep 工具：在文件中搜索文本模式

use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use regex::RegexBuilder;
use serde_json::Value;

use crate::tools::{Tool, ToolResult};

/// 输出行数上限，超出部分折叠为 "+N more" 提示
const MAX_MATCHES: usize = 100;

/// Grep 工具：递归搜索目录（或单个文件），支持正则与字面模式
pub struct GrepTool;

impl GrepTool {
    /// 二进制启发：文件前 1KB 含 NUL 字节则跳过
    fn looks_binary(path: &Path) -> bool {
        let mut head = [0u8; 1024];
        match std::fs::File::open(path) {
            Ok(mut f) => match f.read(&mut head) {
                Ok(n) => head[..n].contains(&0),
                Err(_) => true,
            },
            Err(_) => true,
        }
    }

    fn search_file(path: &Path, re: &regex::Regex, matches: &mut Vec<String>) {
        if Self::looks_binary(path) {
            return;
        }
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        for (line_num, line) in content.split('\n').enumerate() {
            if re.is_match(line) {
                matches.push(format!(
                    "{}:{}: {}",
                    path.display(),
                    line_num + 1,
                    line.trim_end()
                ));
            }
        }
    }
}

#[async_trait]
impl Tool for GrepTool {
    fn name(&self) -> &str {
        "grep"
    }

    fn description(&self) -> &str {
        "Search for text patterns in files. Useful for finding function definitions, imports, or any code pattern."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "The text pattern or regex to search for"
                },
                "path": {
                    "type": "string",
                    "description": "The directory or file to search in (defaults to current directory)"
                },
                "ignore_case": {
                    "type": "boolean",
                    "description": "Whether to ignore case when searching (default: false)"
                },
                "regex": {
                    "type": "boolean",
                    "description": "Whether to treat the pattern as a regex (default: true)"
                }
            },
            "required": ["pattern"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let pattern = match args.get("pattern").and_then(|v| v.as_str()) {
            Some(p) => p,
            None => return ToolResult::fail("grep", "Error: Missing required parameter: pattern"),
        };
        let path = args.get("path").and_then(|v| v.as_str()).unwrap_or(".");
        let ignore_case = args
            .get("ignore_case")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let use_regex = args.get("regex").and_then(|v| v.as_bool()).unwrap_or(true);

        tracing::info!(pattern = %pattern, path = %path, "grep tool execute");

        let title = format!("grep: {}", pattern);
        let search_path = Path::new(path);
        if !search_path.exists() {
            return ToolResult::fail(title, format!("Error: Path not found: {}", path));
        }

        let escaped;
        let effective = if use_regex {
            pattern
        } else {
            escaped = regex::escape(pattern);
            &escaped
        };
        let re = match RegexBuilder::new(effective)
            .case_insensitive(ignore_case)
            .build()
        {
            Ok(re) => re,
            Err(e) => return ToolResult::fail(title, format!("Error: Invalid regex: {}", e)),
        };

        let mut matches = Vec::new();
        if search_path.is_file() {
            Self::search_file(search_path, &re, &mut matches);
        } else {
            for entry in walkdir::WalkDir::new(search_path)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() {
                    Self::search_file(entry.path(), &re, &mut matches);
                }
            }
        }

        if matches.is_empty() {
            return ToolResult::ok(title, "No matches found");
        }

        let total = matches.len();
        let mut output = matches
            .iter()
            .take(MAX_MATCHES)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n");
        if total > MAX_MATCHES {
            output.push_str(&format!("\n... and {} more matches", total - MAX_MATCHES));
        }

        ToolResult::ok(format!("grep: {} ({} matches)", pattern, total), output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_grep_literal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("test.py"),
            "def hello():\n    print('hello')\n    return True",
        )
        .unwrap();

        let result = GrepTool
            .execute(serde_json::json!({
                "pattern": "def hello",
                "path": dir.path().to_str().unwrap(),
                "regex": false
            }))
            .await;
        assert!(result.success);
        assert!(result.output.contains("def hello"));
        assert!(result.output.contains(":1:"));
    }

    #[tokio::test]
    async fn test_grep_regex() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn main() {}\nfn other() {}").unwrap();

        let result = GrepTool
            .execute(serde_json::json!({
                "pattern": "fn \\w+",
                "path": dir.path().to_str().unwrap()
            }))
            .await;
        assert!(result.success);
        assert!(result.title.contains("2 matches"));
    }

    #[tokio::test]
    async fn test_grep_invalid_regex_fails_softly() {
        let dir = tempfile::tempdir().unwrap();

        let result = GrepTool
            .execute(serde_json::json!({
                "pattern": "[unclosed",
                "path": dir.path().to_str().unwrap()
            }))
            .await;
        assert!(!result.success);
        assert!(result.output.contains("Invalid regex"));
    }

    #[tokio::test]
    async fn test_grep_skips_binary_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bin.dat"), [b'h', b'i', 0u8, b'h', b'i']).unwrap();
        std::fs::write(dir.path().join("text.txt"), "hi").unwrap();

        let result = GrepTool
            .execute(serde_json::json!({
                "pattern": "hi",
                "path": dir.path().to_str().unwrap()
            }))
            .await;
        assert!(result.success);
        assert!(result.output.contains("text.txt"));
        assert!(!result.output.contains("bin.dat"));
    }

    #[tokio::test]
    async fn test_grep_no_match() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "nothing here").unwrap();

        let result = GrepTool
            .execute(serde_json::json!({
                "pattern": "absent_token",
                "path": dir.path().to_str().unwrap()
            }))
            .await;
        assert!(result.success);
        assert_eq!(result.output, "No matches found");
    }

    #[tokio::test]
    async fn test_grep_caps_output() {
        let dir = tempfile::tempdir().unwrap();
        let many: String = (0..150).map(|i| format!("match {}\n", i)).collect();
        std::fs::write(dir.path().join("many.txt"), many).unwrap();

        let result = GrepTool
            .execute(serde_json::json!({
                "pattern": "match",
                "path": dir.path().to_str().unwrap()
            }))
            .await;
        assert!(result.success);
        assert!(result.output.contains("... and 50 more matches"));
    }
}
