//! 回合执行层：提取、执行器、REPL、事件

pub mod events;
pub mod extract;
pub mod repl;
pub mod turn;

pub use events::TurnEvent;
pub use extract::{extract_tool_calls, ExtractedCall, Extraction};
pub use repl::{classify_input, interactive_loop, ReplAction};
pub use turn::TurnRunner;

use crate::tools::tool_call_schema_json;

/// 编码助手 system prompt：工具清单 + 文本回落时的 JSON 输出约定
const SYSTEM_PROMPT: &str = r#"You are an AI coding assistant. Your role is to help the user with software development tasks.

You have access to several tools to help you:
- read: Read files to understand code
- write: Create or overwrite files
- edit: Modify existing files
- bash: Execute shell commands
- glob: Find files by pattern
- grep: Search for text in files

IMPORTANT: When you need to use a tool, output ONLY a JSON object like this:
{"name": "tool_name", "arguments": {"param1": "value1", "param2": "value2"}}

Do not include any other text when using tools. Just output the JSON."#;

/// 组装完整 system prompt：基础提示词 + 工具调用 JSON Schema
pub fn build_system_prompt() -> String {
    format!(
        "{}\n\nTool call JSON schema:\n{}",
        SYSTEM_PROMPT,
        tool_call_schema_json()
    )
}
