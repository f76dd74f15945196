//! Agent 错误类型
//!
//! 工具执行失败不在此列：所有工具失败都归一化为 ToolResult { success: false }，
//! 写回对话供模型下一轮参考，绝不作为进程级错误向上传播。

use thiserror::Error;

/// Agent 运行过程中可能出现的错误（网络、存储、配置、取消）
#[derive(Error, Debug)]
pub enum AgentError {
    /// 推理服务不可达或补全请求失败，对当前回合致命
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Session store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    /// 用户中断（Ctrl-C）；调用方须先保存会话再退出
    #[error("Cancelled by user")]
    Cancelled,
}
