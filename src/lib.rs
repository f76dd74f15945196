//! Drone - Rust 本地编码智能体 CLI
//!
//! 模块划分：
//! - **cli**: 子命令定义与处理（run / models / session / agent）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型
//! - **llm**: Chat 客户端抽象与实现（Ollama OpenAI 兼容端点 / Mock）
//! - **run**: 回合执行器、工具调用提取、交互式 REPL
//! - **session**: 会话与消息模型、SQLite 存储
//! - **tools**: 工具箱（read / write / edit / glob / grep / bash）与注册表

pub mod cli;
pub mod config;
pub mod core;
pub mod llm;
pub mod run;
pub mod session;
pub mod tools;
