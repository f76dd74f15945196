//! CLI 子命令定义与分发（run / models / session / agent）

pub mod agent;
pub mod models;
pub mod run;
pub mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "drone",
    version,
    about = "AI-powered development tool with local Ollama"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run drone with a message (main command)
    Run {
        /// Message to send to the AI
        message: Option<String>,
        /// Continue the last session
        #[arg(long = "continue", short = 'c')]
        continue_session: bool,
        /// Continue a specific session
        #[arg(long, short = 's')]
        session: Option<String>,
        /// Model to use
        #[arg(long, short = 'm')]
        model: Option<String>,
        /// Working directory
        #[arg(long, short = 'd')]
        dir: Option<PathBuf>,
    },
    /// List available models from Ollama
    Models {
        /// Refresh model list
        #[arg(long)]
        refresh: bool,
    },
    /// Manage sessions
    Session {
        /// List all sessions
        #[arg(long, short = 'l')]
        list: bool,
        /// Delete a session by ID
        #[arg(long)]
        delete: Option<String>,
    },
    /// Manage agents
    Agent {
        /// List all agents
        #[arg(long, short = 'l')]
        list: bool,
        /// Create a new agent
        #[arg(long, short = 'c')]
        create: bool,
        /// Agent name
        #[arg(long, short = 'n')]
        name: Option<String>,
    },
}

/// 分发子命令；无子命令时打印欢迎与用法
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Run {
            message,
            continue_session,
            session,
            model,
            dir,
        }) => run::run_command(message, continue_session, session, model, dir).await,
        Some(Commands::Models { refresh }) => models::models_command(refresh).await,
        Some(Commands::Session { list, delete }) => session::session_command(list, delete).await,
        Some(Commands::Agent { list, create, name }) => {
            agent::agent_command(list, create, name).await
        }
        None => {
            print_welcome();
            println!("\nUsage:");
            println!("  drone run <message>     Run with a message");
            println!("  drone models            List available models");
            println!("  drone session --list    List sessions");
            println!("  drone --help            Show this help");
            Ok(())
        }
    }
}

pub(crate) fn print_welcome() {
    println!("drone - AI-powered development tool");
    println!("Using local Ollama for AI inference");
}
