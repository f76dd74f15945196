//! models 子命令：列出本地 Ollama 模型

use crate::config::load_config;
use crate::llm::{supports_tools, OllamaClient};

/// 列表总是实时从 /api/tags 拉取，--refresh 仅为接口兼容保留
pub async fn models_command(_refresh: bool) -> anyhow::Result<()> {
    let cfg = load_config(None).unwrap_or_default();
    let client = OllamaClient::new(
        &cfg.provider.base_url,
        &cfg.provider.model,
        cfg.provider.api_key.as_deref(),
    );

    if !client.check_connection().await {
        eprintln!("Error: Cannot connect to Ollama");
        eprintln!("Make sure Ollama is running: ollama serve");
        anyhow::bail!("inference server unreachable at {}", cfg.provider.base_url);
    }

    let models = client.list_models().await.unwrap_or_default();
    if models.is_empty() {
        println!("No models found");
        println!("Download a model: ollama pull llama3");
        return Ok(());
    }

    println!("Available Ollama models (tool-capable marked with *):");
    for model in &models {
        let marker = if supports_tools(model) { " *" } else { "" };
        println!("  {}{}", model, marker);
    }
    println!("\nUsing model: {}", cfg.provider.model);
    Ok(())
}
