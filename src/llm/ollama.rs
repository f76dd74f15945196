//! Ollama 客户端
//!
//! 通过 async_openai 调用本地 Ollama 的 OpenAI 兼容端点（/v1/chat/completions）；
//! 模型列表与连通性检查走原生 /api/tags。

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
    ChatCompletionMessageToolCalls, ChatCompletionRequestUserMessageArgs, ChatCompletionTool,
    ChatCompletionTools, CreateChatCompletionRequestArgs, FunctionObjectArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::core::AgentError;
use crate::llm::{ChatClient, ChatReply, RawToolCall};
use crate::session::{Message, Role};
use crate::tools::ToolSpec;

/// 已知支持结构化工具调用的模型（按子串匹配）
const TOOL_CAPABLE_MODELS: &[&str] = &[
    "qwen2.5-coder",
    "qwen2.5",
    "qwen3",
    "llama3.1",
    "llama3.2",
    "llama3.3",
    "gemma2",
    "gemma3",
    "mistral",
    "deepseek-coder",
    "glm",
];

/// 模型是否支持结构化工具调用
pub fn supports_tools(model: &str) -> bool {
    let model_lower = model.to_lowercase();
    TOOL_CAPABLE_MODELS
        .iter()
        .any(|capable| model_lower.contains(capable))
}

/// Ollama 客户端：持有 OpenAI 兼容 Client 与 model 名
pub struct OllamaClient {
    client: Client<OpenAIConfig>,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, api_key: Option<&str>) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(base_url)
            .with_api_key(api_key.unwrap_or("not-needed"));
        Self {
            client: Client::with_config(config),
            base_url: base_url.to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// 原生 Ollama 端点根地址（去掉 OpenAI 兼容的 /v1 后缀）
    fn native_base(&self) -> String {
        self.base_url.trim_end_matches("/v1").to_string()
    }

    /// 从 /api/tags 列出本地已安装模型名
    pub async fn list_models(&self) -> Result<Vec<String>, AgentError> {
        let url = format!("{}/api/tags", self.native_base());
        let resp = reqwest::get(&url)
            .await
            .map_err(|e| AgentError::Llm(format!("Error listing models: {}", e)))?;
        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| AgentError::Llm(format!("Error listing models: {}", e)))?;
        let models = data["models"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|m| m["name"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();
        Ok(models)
    }

    /// Ollama 是否在运行（/api/tags，5 秒超时）
    pub async fn check_connection(&self) -> bool {
        let url = format!("{}/api/tags", self.native_base());
        let client = match reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
        {
            Ok(c) => c,
            Err(_) => return false,
        };
        matches!(client.get(&url).send().await, Ok(resp) if resp.status().is_success())
    }

    fn to_openai_messages(&self, messages: &[Message]) -> Vec<ChatCompletionRequestMessage> {
        messages
            .iter()
            .map(|m| match m.role {
                Role::System => ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(m.content.clone())
                        .build()
                        .unwrap(),
                ),
                Role::User => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(m.content.clone())
                        .build()
                        .unwrap(),
                ),
                Role::Assistant => ChatCompletionRequestMessage::Assistant(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(m.content.clone())
                        .build()
                        .unwrap(),
                ),
                Role::Tool => ChatCompletionRequestMessage::Tool(
                    ChatCompletionRequestToolMessageArgs::default()
                        .content(m.content.clone())
                        .tool_call_id(m.tool_call_id.clone().unwrap_or_default())
                        .build()
                        .unwrap(),
                ),
            })
            .collect()
    }

    fn to_openai_tools(&self, tools: &[ToolSpec]) -> Vec<ChatCompletionTools> {
        tools
            .iter()
            .map(|t| {
                ChatCompletionTools::Function(ChatCompletionTool {
                    function: FunctionObjectArgs::default()
                        .name(t.name.clone())
                        .description(t.description.clone())
                        .parameters(t.parameters.clone())
                        .build()
                        .unwrap(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    fn supports_tools(&self) -> bool {
        supports_tools(&self.model)
    }

    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSpec]>,
    ) -> Result<ChatReply, AgentError> {
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .messages(self.to_openai_messages(messages));
        if let Some(specs) = tools {
            builder.tools(self.to_openai_tools(specs));
        }
        let request = builder
            .build()
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Llm("Empty response from Ollama".to_string()))?;

        let content = choice.message.content.unwrap_or_default();
        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| match tc {
                ChatCompletionMessageToolCalls::Function(f) => Some(RawToolCall {
                    id: f.id,
                    name: f.function.name,
                    arguments: f.function.arguments,
                }),
                _ => None,
            })
            .collect();

        tracing::debug!(model = %self.model, "chat completion received");
        Ok(ChatReply {
            content,
            tool_calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports_tools() {
        assert!(supports_tools("qwen2.5-coder:7b"));
        assert!(supports_tools("Llama3.1:70b"));
        assert!(supports_tools("mistral:latest"));
        assert!(!supports_tools("codellama:13b"));
        assert!(!supports_tools("phi3:mini"));
    }

    #[test]
    fn test_native_base_strips_v1() {
        let client = OllamaClient::new("http://localhost:11434/v1", "qwen2.5", None);
        assert_eq!(client.native_base(), "http://localhost:11434");
    }
}
