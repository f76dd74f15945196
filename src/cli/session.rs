//! session 子命令：会话列表与删除

use crate::config::load_config;
use crate::session::SessionStore;

pub async fn session_command(list: bool, delete: Option<String>) -> anyhow::Result<()> {
    let cfg = load_config(None).unwrap_or_default();
    let store = SessionStore::open(cfg.agent.data_dir.join("sessions.db"))?;

    if let Some(id) = delete {
        store.delete(&id)?;
        println!("Deleted session: {}", id);
        return Ok(());
    }

    if !list {
        println!("Use --list to list sessions or --delete to delete");
        return Ok(());
    }

    let sessions = store.list(10)?;
    if sessions.is_empty() {
        println!("No sessions found");
        return Ok(());
    }

    println!(
        "{:<12} {:<20} {:<20} {:>5}  {}",
        "ID", "Created", "Updated", "Msgs", "Model"
    );
    for session in sessions {
        let short_id: String = session.id.chars().take(8).collect();
        println!(
            "{:<12} {:<20} {:<20} {:>5}  {}",
            format!("{}...", short_id),
            session.created_at.format("%Y-%m-%d %H:%M:%S"),
            session.updated_at.format("%Y-%m-%d %H:%M:%S"),
            session.messages.len(),
            session.model,
        );
    }
    Ok(())
}
