//! 交互式 REPL
//!
//! 单任务读取-分发循环：空行忽略，exit/quit（不区分大小写）保存后退出，
//! 其余输入作为 user 消息驱动一次回合。中断与回合错误都先落盘再离开 —
//! 丢失对话历史是正确性 bug，不是可接受的降级。

use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::core::AgentError;
use crate::run::turn::TurnRunner;
use crate::session::{Message, Session};

/// 一行输入的分发结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplAction {
    /// 空行：不触发回合
    Ignore,
    /// exit / quit：保存并退出
    Exit,
    /// 普通输入：作为 user 消息跑一个回合
    Run,
}

/// 对一行输入分类
pub fn classify_input(line: &str) -> ReplAction {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        ReplAction::Ignore
    } else if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        ReplAction::Exit
    } else {
        ReplAction::Run
    }
}

/// 运行交互循环；所有返回路径都已保存会话
pub async fn interactive_loop(
    runner: &TurnRunner<'_>,
    session: &mut Session,
) -> Result<(), AgentError> {
    println!("\nInteractive mode. Type 'exit' or 'quit' to end session.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let line = tokio::select! {
            _ = runner.cancel_token.cancelled() => {
                println!("\nInterrupted. Saving session...");
                runner.store.save(session)?;
                return Ok(());
            }
            // 读取失败与 EOF 同样处理：保存后离开
            l = lines.next_line() => l.unwrap_or(None),
        };

        let Some(input) = line else {
            // EOF（管道输入耗尽）
            runner.store.save(session)?;
            return Ok(());
        };

        match classify_input(&input) {
            ReplAction::Ignore => continue,
            ReplAction::Exit => {
                println!("Saving session...");
                runner.store.save(session)?;
                println!("Session saved: {}", session.id);
                return Ok(());
            }
            ReplAction::Run => {
                session.add_message(Message::user(input.trim()));
                match runner.run(session).await {
                    Ok(()) => {
                        runner.store.save(session)?;
                    }
                    Err(AgentError::Cancelled) => {
                        println!("\nInterrupted. Saving session...");
                        runner.store.save(session)?;
                        return Ok(());
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        runner.store.save(session)?;
                        return Ok(());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_blank() {
        assert_eq!(classify_input(""), ReplAction::Ignore);
        assert_eq!(classify_input("   "), ReplAction::Ignore);
    }

    #[test]
    fn test_classify_exit_case_insensitive() {
        assert_eq!(classify_input("exit"), ReplAction::Exit);
        assert_eq!(classify_input("QUIT"), ReplAction::Exit);
        assert_eq!(classify_input(" Exit "), ReplAction::Exit);
    }

    #[test]
    fn test_classify_normal_input() {
        assert_eq!(classify_input("fix the bug"), ReplAction::Run);
        assert_eq!(classify_input("exit the loop please"), ReplAction::Run);
    }
}
