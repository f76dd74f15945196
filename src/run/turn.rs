//! 回合执行器
//!
//! 状态机：AwaitingModel -> HasResponse -> {Done | HasToolCalls} -> ToolsExecuted -> 递归。
//! 递归以显式迭代计数实现，受 max_iterations 约束，防止模型无限请求工具；
//! 每批工具执行完即落盘，传输失败向上传播（调用方仍会保存已构建的对话）。

use tokio_util::sync::CancellationToken;

use crate::core::AgentError;
use crate::llm::ChatClient;
use crate::run::events::{preview, send_event, TurnEvent};
use crate::run::extract::extract_tool_calls;
use crate::session::{Message, Session, ToolCallRecord};
use crate::tools::ToolRegistry;

/// 回合执行器：持有 chat 客户端、工具注册表、会话存储与取消令牌
pub struct TurnRunner<'a> {
    pub client: &'a dyn ChatClient,
    pub registry: &'a ToolRegistry,
    pub store: &'a crate::session::SessionStore,
    /// 单回合内模型请求次数上限，到达后停止并警告（fail closed）
    pub max_iterations: usize,
    pub cancel_token: CancellationToken,
    /// 可选事件通道：无头运行时为 None
    pub event_tx: Option<&'a tokio::sync::mpsc::UnboundedSender<TurnEvent>>,
}

impl<'a> TurnRunner<'a> {
    pub fn new(
        client: &'a dyn ChatClient,
        registry: &'a ToolRegistry,
        store: &'a crate::session::SessionStore,
        max_iterations: usize,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            client,
            registry,
            store,
            max_iterations,
            cancel_token,
            event_tx: None,
        }
    }

    /// 设置事件通道
    pub fn with_event_tx(
        mut self,
        tx: &'a tokio::sync::mpsc::UnboundedSender<TurnEvent>,
    ) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// 执行一个回合：请求模型、执行提取出的工具调用、写回结果，
    /// 直到模型不再请求工具或达到迭代上限
    pub async fn run(&self, session: &mut Session) -> Result<(), AgentError> {
        let schemas = self.registry.schemas();
        let tools_supported = self.client.supports_tools();
        if !tools_supported {
            send_event(
                &self.event_tx,
                TurnEvent::Warning(format!(
                    "Model {} may not support tool calling; relying on text fallback extraction",
                    session.model
                )),
            );
        }

        for iteration in 0..self.max_iterations {
            if self.cancel_token.is_cancelled() {
                return Err(AgentError::Cancelled);
            }

            tracing::debug!(iteration, messages = session.messages.len(), "awaiting model");
            let reply = tokio::select! {
                _ = self.cancel_token.cancelled() => return Err(AgentError::Cancelled),
                r = self.client.chat(
                    &session.messages,
                    if tools_supported { Some(&schemas) } else { None },
                ) => r?,
            };

            let extraction = extract_tool_calls(&reply.content, &reply.tool_calls);

            // 模型的自然语言叙述先进对话，即使它同时请求了工具
            if !reply.content.is_empty() || !reply.tool_calls.is_empty() {
                let mut message = Message::assistant(&reply.content);
                if !reply.tool_calls.is_empty() {
                    message.tool_calls = Some(
                        reply
                            .tool_calls
                            .iter()
                            .zip(&extraction.calls)
                            .map(|(raw, call)| ToolCallRecord {
                                id: raw.id.clone(),
                                name: raw.name.clone(),
                                arguments: call.arguments.clone(),
                            })
                            .collect(),
                    );
                }
                session.add_message(message);
            }

            if !extraction.display_text.is_empty() {
                send_event(
                    &self.event_tx,
                    TurnEvent::AssistantText(extraction.display_text.clone()),
                );
            }

            if extraction.calls.is_empty() {
                return Ok(());
            }

            for call in &extraction.calls {
                send_event(
                    &self.event_tx,
                    TurnEvent::ToolStart {
                        name: call.name.clone(),
                    },
                );

                let tool = match self.registry.get(&call.name) {
                    Some(t) => t,
                    None => {
                        // 未知工具：报告并跳过该条，批内其余调用照常执行
                        tracing::warn!(tool = %call.name, "unknown tool requested");
                        send_event(
                            &self.event_tx,
                            TurnEvent::Warning(format!("Tool not found: {}", call.name)),
                        );
                        continue;
                    }
                };

                let result = tokio::select! {
                    _ = self.cancel_token.cancelled() => return Err(AgentError::Cancelled),
                    r = tool.execute(call.arguments.clone()) => r,
                };

                send_event(
                    &self.event_tx,
                    TurnEvent::ToolResult {
                        title: result.title.clone(),
                        output: preview(&result.output),
                        success: result.success,
                    },
                );

                // 完整结果（不截断）序列化进对话，供模型下一轮使用
                session.add_tool_result(&call.id, serde_json::to_string(&result)?);
            }

            // 每批工具执行完即落盘，中断也不会丢已完成的工作
            self.store.save(session)?;
        }

        tracing::warn!(max_iterations = self.max_iterations, "iteration limit reached");
        send_event(
            &self.event_tx,
            TurnEvent::Warning(format!(
                "Reached max iterations ({}), stopping this turn",
                self.max_iterations
            )),
        );
        Ok(())
    }
}
