//! LLM 层：Chat 客户端抽象与实现（Ollama OpenAI 兼容端点 / Mock）

pub mod mock;
pub mod ollama;
pub mod traits;

pub use mock::MockChatClient;
pub use ollama::{supports_tools, OllamaClient};
pub use traits::{ChatClient, ChatReply, RawToolCall};
