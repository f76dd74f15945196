//! Shell 执行工具
//!
//! 通过 sh -c / cmd /C 运行命令，带硬超时；stdout 与 stderr 分开捕获，
//! stderr 以 [stderr] 标记拼接，非零退出码以 [exit code: N] 前缀标注。

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use crate::tools::{Tool, ToolResult};

/// 标题里命令的最大展示长度（字符）
const TITLE_COMMAND_CHARS: usize = 50;

/// Bash 工具：执行 shell 命令，超时是软失败而非崩溃
pub struct BashTool {
    timeout_secs: u64,
}

impl BashTool {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    fn title(command: &str, description: &str) -> String {
        if !description.is_empty() {
            description.to_string()
        } else {
            let short: String = command.chars().take(TITLE_COMMAND_CHARS).collect();
            format!("bash: {}...", short)
        }
    }
}

#[async_trait]
impl Tool for BashTool {
    fn name(&self) -> &str {
        "bash"
    }

    fn description(&self) -> &str {
        "Execute a shell command and return its output. Use this to run git, npm, python, and other shell commands."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                },
                "description": {
                    "type": "string",
                    "description": "Description of what this command does"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let command = match args.get("command").and_then(|v| v.as_str()) {
            Some(c) => c,
            None => return ToolResult::fail("bash", "Error: Missing required parameter: command"),
        };
        let description = args
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let title = Self::title(command, description);

        tracing::info!(command = %command, "bash tool execute");

        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };

        let output = match tokio::time::timeout(
            std::time::Duration::from_secs(self.timeout_secs),
            cmd.output(),
        )
        .await
        {
            Ok(Ok(o)) => o,
            Ok(Err(e)) => return ToolResult::fail(title, format!("Error: {}", e)),
            Err(_) => {
                return ToolResult::fail(
                    title,
                    format!("Error: Command timed out after {} seconds", self.timeout_secs),
                );
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        let mut text = stdout;
        if !stderr.is_empty() {
            text.push_str(&format!("\n[stderr] {}", stderr));
        }
        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            text = format!("[exit code: {}]\n{}", code, text);
            return ToolResult::fail(title, text);
        }

        ToolResult::ok(title, text)
    }
}
