//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / parameters_schema / execute），
//! 由 ToolRegistry 按注册顺序存储、按名查找，并生成注入 chat 请求的 schema 列表。

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 工具执行结果；执行失败也通过 success=false 表达，execute 永不向外抛错
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// 展示用标题，如 "Read src/main.rs (42 lines, 1024 bytes)"
    pub title: String,
    /// 完整输出；展示时可截断，写入对话时保留全文
    pub output: String,
    pub success: bool,
}

impl ToolResult {
    pub fn ok(title: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            output: output.into(),
            success: true,
        }
    }

    pub fn fail(title: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            output: output.into(),
            success: false,
        }
    }
}

/// 注入 chat 请求的单个工具描述（function-calling 形状的三元组）
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// {"type": "object", "properties": {...}, "required": [...]}
    pub parameters: Value,
}

/// 工具 trait：名称、描述（供 LLM 理解）、参数 schema、异步执行（args 为 JSON 对象）
///
/// 契约：任何执行失败（文件缺失、正则非法、超时、权限、二进制内容、非零退出码）
/// 都归一化为 success=false 的 ToolResult，回合执行器无需针对具体工具做错误处理。
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称（模型调用时的 "name" 字段）
    fn name(&self) -> &str;

    /// 工具描述（供 LLM 理解功能）
    fn description(&self) -> &str;

    /// 参数 JSON Schema；默认无参数
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    /// 执行工具；永不返回 Err
    async fn execute(&self, args: Value) -> ToolResult;
}

/// 工具注册表：按注册顺序存储 Arc<dyn Tool>，支持 register / get / tool_names / schemas
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.push(Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// 按注册顺序生成工具 schema 列表，供 chat 请求注入
    pub fn schemas(&self) -> Vec<ToolSpec> {
        self.tools
            .iter()
            .map(|t| ToolSpec {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters_schema(),
            })
            .collect()
    }
}
