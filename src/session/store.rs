//! SQLite 会话存储
//!
//! 按 id upsert（last-writer-wins，无乐观并发控制）；消息序列以 JSON 数组存入 messages 列。
//! Connection 以 Mutex 包裹，单进程单用户场景下足够。

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::AgentError;
use crate::session::{Message, Session};

/// SQLite 会话存储：save / get / get_latest / list / delete
pub struct SessionStore {
    conn: Mutex<Connection>,
}

impl SessionStore {
    /// 打开（或创建）数据库并建表
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, AgentError> {
        if let Some(parent) = db_path.as_ref().parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let conn = Connection::open(db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                messages TEXT,
                model TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 按 id upsert 会话
    pub fn save(&self, session: &Session) -> Result<(), AgentError> {
        let messages = serde_json::to_string(&session.messages)?;
        let conn = self.conn.lock().expect("session store lock poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO sessions (id, created_at, updated_at, messages, model)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session.id,
                session.created_at,
                session.updated_at,
                messages,
                session.model
            ],
        )?;
        Ok(())
    }

    /// 按 id 查询
    pub fn get(&self, session_id: &str) -> Result<Option<Session>, AgentError> {
        let conn = self.conn.lock().expect("session store lock poisoned");
        let row = conn
            .query_row(
                "SELECT id, created_at, updated_at, messages, model FROM sessions WHERE id = ?1",
                params![session_id],
                row_to_session,
            )
            .optional()?;
        row.map(parse_messages).transpose()
    }

    /// 最近更新的会话（updated_at 降序）
    pub fn get_latest(&self) -> Result<Option<Session>, AgentError> {
        let conn = self.conn.lock().expect("session store lock poisoned");
        let row = conn
            .query_row(
                "SELECT id, created_at, updated_at, messages, model FROM sessions
                 ORDER BY updated_at DESC LIMIT 1",
                [],
                row_to_session,
            )
            .optional()?;
        row.map(parse_messages).transpose()
    }

    /// 按 updated_at 降序列出最多 limit 个会话
    pub fn list(&self, limit: usize) -> Result<Vec<Session>, AgentError> {
        let conn = self.conn.lock().expect("session store lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, created_at, updated_at, messages, model FROM sessions
             ORDER BY updated_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], row_to_session)?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(parse_messages(row?)?);
        }
        Ok(sessions)
    }

    /// 按 id 删除
    pub fn delete(&self, session_id: &str) -> Result<(), AgentError> {
        let conn = self.conn.lock().expect("session store lock poisoned");
        conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
        Ok(())
    }
}

/// 行内 messages 列暂存为原始 JSON，出锁后再反序列化
struct SessionRow {
    session: Session,
    messages_json: Option<String>,
}

fn row_to_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        session: Session {
            id: row.get(0)?,
            created_at: row.get(1)?,
            updated_at: row.get(2)?,
            messages: Vec::new(),
            model: row.get(4)?,
        },
        messages_json: row.get(3)?,
    })
}

fn parse_messages(row: SessionRow) -> Result<Session, AgentError> {
    let mut session = row.session;
    if let Some(json) = row.messages_json {
        let messages: Vec<Message> = serde_json::from_str(&json)?;
        session.messages = messages;
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Message, Role};

    fn temp_store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(dir.path().join("sessions.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_save_get_round_trip() {
        let (_dir, store) = temp_store();
        let mut session = Session::create("test");
        session.add_message(Message::user("Test"));
        session.add_message(Message::assistant("Reply"));
        session.add_tool_result("call_1", r#"{"title":"t","output":"o","success":true}"#);

        store.save(&session).unwrap();
        let loaded = store.get(&session.id).unwrap().unwrap();

        assert_eq!(loaded.id, session.id);
        assert_eq!(loaded.model, "test");
        assert_eq!(loaded.messages.len(), 3);
        assert_eq!(loaded.messages[0].role, Role::User);
        assert_eq!(loaded.messages[2].tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn test_get_missing_returns_none() {
        let (_dir, store) = temp_store();
        assert!(store.get("no-such-id").unwrap().is_none());
        assert!(store.get_latest().unwrap().is_none());
    }

    #[test]
    fn test_get_latest_orders_by_updated_at() {
        let (_dir, store) = temp_store();
        let old = Session::create("m1");
        store.save(&old).unwrap();
        let mut new = Session::create("m2");
        new.add_message(Message::user("newer"));
        store.save(&new).unwrap();

        let latest = store.get_latest().unwrap().unwrap();
        assert_eq!(latest.id, new.id);
    }

    #[test]
    fn test_save_is_upsert() {
        let (_dir, store) = temp_store();
        let mut session = Session::create("m");
        store.save(&session).unwrap();
        session.add_message(Message::user("one"));
        store.save(&session).unwrap();

        assert_eq!(store.list(10).unwrap().len(), 1);
        let loaded = store.get(&session.id).unwrap().unwrap();
        assert_eq!(loaded.messages.len(), 1);
    }

    #[test]
    fn test_delete() {
        let (_dir, store) = temp_store();
        let session = Session::create("m");
        store.save(&session).unwrap();
        store.delete(&session.id).unwrap();
        assert!(store.get(&session.id).unwrap().is_none());
    }
}
