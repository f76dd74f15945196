//! 工具调用 JSON Schema 生成（schemars 自动生成）
//!
//! 将「合法 tool call」的 JSON 结构拼入 system prompt，减少模型输出格式错误。

use std::collections::HashMap;

use schemars::{schema_for, JsonSchema};

/// 工具调用请求格式：与回落提取解析的 `{"name": "...", "arguments": {...}}` 一致（仅用于 Schema 生成）
#[allow(dead_code)]
#[derive(JsonSchema)]
struct ToolCallFormat {
    /// 工具名，如 read、write、edit、glob、grep、bash
    pub name: String,
    /// 工具参数，依工具不同而不同（file_path、pattern、command 等）
    pub arguments: HashMap<String, serde_json::Value>,
}

/// 返回工具调用的 JSON Schema 字符串，可拼入 system prompt
pub fn tool_call_schema_json() -> String {
    let schema = schema_for!(ToolCallFormat);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| String::new())
}
