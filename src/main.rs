//! Drone - Rust 本地编码智能体 CLI
//!
//! 入口：初始化日志、解析子命令并分发。

use clap::Parser;
use drone::cli::{execute, Cli};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    execute(cli).await
}
