//! 工具调用提取
//!
//! 结构化通道优先、原样采用；否则按「最具体优先」的有序文本模式回落提取。
//! 目标模型不保证走结构化工具调用通道，提取必须优雅降级，
//! 不能悄悄丢掉一次工具调用，也不能把格式错误升级为回合错误。

use regex::Regex;
use serde_json::Value;

use crate::llm::RawToolCall;

/// 文本回落模式，按顺序尝试，命中第一个即停（不跨模式聚合）：
/// ```json 围栏块、任意代码围栏块、裸 JSON 对象
const FALLBACK_PATTERNS: &[&str] = &[
    r"(?s)```json\s*(\{.*?\})\s*```",
    r"(?s)```\s*(\{.*?\})\s*```",
    r#"(?s)\{"name":\s*"[^"]+",\s*"arguments":\s*\{.*?\}\}"#,
];

/// 规范化后的工具调用
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedCall {
    /// 关联 ID：回指工具结果消息；结构化调用用上游 ID，回落提取按工具名确定性生成
    pub id: String,
    pub name: String,
    /// 参数对象（已解析）
    pub arguments: Value,
}

/// 提取结果：有序工具调用 + 剥离调用标记后的展示文本
#[derive(Debug, Clone)]
pub struct Extraction {
    pub calls: Vec<ExtractedCall>,
    pub display_text: String,
}

/// 从模型回复中提取工具调用
///
/// 1. 上游返回结构化调用时原样采用（最高信任）
/// 2. 否则按 FALLBACK_PATTERNS 顺序扫描文本，命中的片段须含 name + arguments，
///    解析失败视为「本回合无工具调用」
pub fn extract_tool_calls(content: &str, structured: &[RawToolCall]) -> Extraction {
    if !structured.is_empty() {
        let calls = structured
            .iter()
            .map(|tc| ExtractedCall {
                id: tc.id.clone(),
                name: tc.name.clone(),
                arguments: serde_json::from_str(&tc.arguments)
                    .unwrap_or_else(|_| serde_json::json!({})),
            })
            .collect();
        return Extraction {
            calls,
            display_text: content.to_string(),
        };
    }

    for pattern in FALLBACK_PATTERNS {
        let Ok(re) = Regex::new(pattern) else {
            continue;
        };
        let Some(m) = re.captures(content) else {
            continue;
        };
        // 围栏模式的 JSON 在捕获组 1，裸对象模式整段即 JSON
        let span = m.get(0).map(|g| g.as_str()).unwrap_or_default();
        let json_str = m.get(1).map(|g| g.as_str()).unwrap_or(span);

        let call = parse_call(json_str);
        let calls = match call {
            Some(c) => vec![c],
            // 命中模式但解析失败：按「无工具调用」处理，原文照常展示
            None => {
                return Extraction {
                    calls: Vec::new(),
                    display_text: content.to_string(),
                };
            }
        };
        let display_text = content.replacen(span, "", 1).trim().to_string();
        return Extraction {
            calls,
            display_text,
        };
    }

    Extraction {
        calls: Vec::new(),
        display_text: content.to_string(),
    }
}

fn parse_call(json_str: &str) -> Option<ExtractedCall> {
    let value: Value = serde_json::from_str(json_str).ok()?;
    let name = value.get("name")?.as_str()?;
    let arguments = value.get("arguments")?;
    if !arguments.is_object() {
        return None;
    }
    Some(ExtractedCall {
        id: fallback_call_id(name),
        name: name.to_string(),
        arguments: arguments.clone(),
    })
}

/// 回落调用的关联 ID：按工具名 FNV-1a 确定性生成；
/// 回合内稳定即可（文本路径每条回复至多一个调用）
pub fn fallback_call_id(name: &str) -> String {
    format!("call_{:x}", fnv1a(name))
}

fn fnv1a(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in s.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x1_0000_0001_b3);
    }
    hash
}
