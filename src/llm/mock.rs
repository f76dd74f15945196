//! Mock Chat 客户端（测试用，无需 Ollama）
//!
//! 按脚本顺序返回预置回复，耗尽后回显最后一条用户消息，便于驱动回合执行器测试。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::AgentError;
use crate::llm::{ChatClient, ChatReply};
use crate::session::{Message, Role};
use crate::tools::ToolSpec;

/// Mock 客户端：脚本化回复队列
#[derive(Debug, Default)]
pub struct MockChatClient {
    replies: Mutex<VecDeque<ChatReply>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一批回复，chat 按顺序弹出
    pub fn with_replies(replies: Vec<ChatReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }

    pub fn push_reply(&self, reply: ChatReply) {
        self.replies
            .lock()
            .expect("mock reply lock poisoned")
            .push_back(reply);
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn chat(
        &self,
        messages: &[Message],
        _tools: Option<&[ToolSpec]>,
    ) -> Result<ChatReply, AgentError> {
        if let Some(reply) = self
            .replies
            .lock()
            .expect("mock reply lock poisoned")
            .pop_front()
        {
            return Ok(reply);
        }
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");
        Ok(ChatReply {
            content: format!("Echo from Mock: {}", last_user),
            tool_calls: Vec::new(),
        })
    }
}
