//! run 子命令：主执行入口
//!
//! 连通性检查是唯一的非零退出路径；工具/回合失败只内联报告，不改变退出码。
//! 所有终止路径（正常完成、中断、回合错误）都先保存会话。

use std::path::PathBuf;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::cli::print_welcome;
use crate::config::load_config;
use crate::core::AgentError;
use crate::llm::{ChatClient, OllamaClient};
use crate::run::{build_system_prompt, interactive_loop, TurnEvent, TurnRunner};
use crate::session::{Message, Session, SessionStore};
use crate::tools::default_registry;

pub async fn run_command(
    message: Option<String>,
    continue_session: bool,
    session_id: Option<String>,
    model: Option<String>,
    dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let cfg = load_config(None).unwrap_or_default();

    let probe = OllamaClient::new(
        &cfg.provider.base_url,
        &cfg.provider.model,
        cfg.provider.api_key.as_deref(),
    );
    if !probe.check_connection().await {
        eprintln!("Error: Cannot connect to Ollama");
        eprintln!("Make sure Ollama is running: ollama serve");
        anyhow::bail!("inference server unreachable at {}", cfg.provider.base_url);
    }

    if let Some(ref dir) = dir {
        std::env::set_current_dir(dir)
            .with_context(|| format!("cannot change to directory '{}'", dir.display()))?;
    }

    print_welcome();

    let store = SessionStore::open(cfg.agent.data_dir.join("sessions.db"))?;

    let mut session = if let Some(ref id) = session_id {
        match store.get(id)? {
            Some(s) => s,
            None => {
                eprintln!("Session not found: {}", id);
                return Ok(());
            }
        }
    } else if continue_session {
        match store.get_latest()? {
            Some(s) => s,
            None => {
                println!("No previous session found");
                println!("Starting a new session...");
                Session::create(model.clone().unwrap_or_else(|| cfg.provider.model.clone()))
            }
        }
    } else {
        Session::create(model.clone().unwrap_or_else(|| cfg.provider.model.clone()))
    };

    let client = OllamaClient::new(
        &cfg.provider.base_url,
        &session.model,
        cfg.provider.api_key.as_deref(),
    );

    if session.messages.is_empty() {
        session.add_message(Message::system(build_system_prompt()));
    }

    let registry = default_registry(cfg.tools.shell_timeout_secs);

    // Ctrl-C -> 取消令牌；回合在挂起点协作式退出后由下方保证落盘
    let cancel_token = CancellationToken::new();
    {
        let token = cancel_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });
    }

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<TurnEvent>();
    let renderer = tokio::spawn(async move {
        while let Some(ev) = event_rx.recv().await {
            render_event(&ev);
        }
    });

    if !client.supports_tools() {
        println!(
            "Warning: Model {} may not support tools. Use a model like qwen2.5-coder or llama3.1 for tool support.",
            session.model
        );
    }

    let result = {
        let runner = TurnRunner::new(
            &client,
            &registry,
            &store,
            cfg.agent.max_iterations,
            cancel_token.clone(),
        )
        .with_event_tx(&event_tx);

        if let Some(text) = message {
            session.add_message(Message::user(text));
            runner.run(&mut session).await
        } else {
            interactive_loop(&runner, &mut session).await
        }
    };

    // 终止路径统一落盘；此处失败只报告，不影响退出码
    if let Err(e) = store.save(&session) {
        eprintln!("Error: failed to save session: {}", e);
    }

    drop(event_tx);
    let _ = renderer.await;

    match result {
        Ok(()) => {}
        Err(AgentError::Cancelled) => println!("\nInterrupted. Session saved: {}", session.id),
        Err(e) => eprintln!("Error: {}", e),
    }

    Ok(())
}

fn render_event(ev: &TurnEvent) {
    match ev {
        TurnEvent::AssistantText(text) => {
            println!("\nAssistant:\n{}", text);
        }
        TurnEvent::ToolStart { name } => {
            println!("\nUsing tool: {}", name);
        }
        TurnEvent::ToolResult { title, output, .. } => {
            println!("{}", title);
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        TurnEvent::Warning(text) => {
            println!("Warning: {}", text);
        }
    }
}
