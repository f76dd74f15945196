//! Chat 客户端抽象
//!
//! 回合执行器只依赖此 trait：发送完整对话 + 工具 schema，拿回内容与可选的结构化工具调用。

use async_trait::async_trait;

use crate::core::AgentError;
use crate::session::Message;
use crate::tools::ToolSpec;

/// 上游返回的结构化工具调用（arguments 为 JSON 字符串，与 OpenAI API 一致）
#[derive(Debug, Clone)]
pub struct RawToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

/// 一次补全的结果：文本内容 + 结构化工具调用（可能为空）
#[derive(Debug, Clone, Default)]
pub struct ChatReply {
    pub content: String,
    pub tool_calls: Vec<RawToolCall>,
}

/// Chat 客户端 trait：非流式补全
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// 发送完整对话与工具 schema，阻塞到拿回完整回复；传输失败对当前回合致命
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSpec]>,
    ) -> Result<ChatReply, AgentError>;

    /// 绑定模型是否支持结构化工具调用；不支持时仍发请求，仅走文本回落提取
    fn supports_tools(&self) -> bool {
        true
    }
}
