//! 回合执行器集成测试
//!
//! 用脚本化 Mock 客户端驱动 TurnRunner，覆盖：无工具回合、文本回落提取、
//! 批内顺序与关联 ID、未知工具跳过、迭代上限、传输失败与取消后的持久化。

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use drone::core::AgentError;
use drone::llm::{ChatClient, ChatReply, MockChatClient, RawToolCall};
use drone::run::extract::fallback_call_id;
use drone::run::{TurnEvent, TurnRunner};
use drone::session::{Message, Role, Session, SessionStore};
use drone::tools::{default_registry, ToolSpec};

fn text_reply(content: &str) -> ChatReply {
    ChatReply {
        content: content.to_string(),
        tool_calls: Vec::new(),
    }
}

fn structured_reply(content: &str, calls: Vec<(&str, &str, &str)>) -> ChatReply {
    ChatReply {
        content: content.to_string(),
        tool_calls: calls
            .into_iter()
            .map(|(id, name, args)| RawToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: args.to_string(),
            })
            .collect(),
    }
}

fn new_session() -> Session {
    let mut session = Session::create("test-model");
    session.add_message(Message::system("You are a coding assistant."));
    session.add_message(Message::user("hi"));
    session
}

fn temp_store() -> (tempfile::TempDir, SessionStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::open(dir.path().join("sessions.db")).unwrap();
    (dir, store)
}

#[tokio::test]
async fn test_single_turn_no_tools() {
    let (_dir, store) = temp_store();
    let client = MockChatClient::with_replies(vec![text_reply("hello")]);
    let registry = default_registry(60);
    let mut session = new_session();

    let runner = TurnRunner::new(&client, &registry, &store, 10, CancellationToken::new());
    runner.run(&mut session).await.unwrap();

    assert_eq!(session.messages.len(), 3);
    assert_eq!(session.messages[2].role, Role::Assistant);
    assert_eq!(session.messages[2].content, "hello");
    assert!(session.messages.iter().all(|m| m.role != Role::Tool));
}

#[tokio::test]
async fn test_fallback_extraction_runs_tool() {
    let (_dir, store) = temp_store();
    let workdir = tempfile::tempdir().unwrap();
    let fenced = format!(
        "```json\n{{\"name\":\"glob\",\"arguments\":{{\"pattern\":\"*.nomatch\",\"path\":\"{}\"}}}}\n```",
        workdir.path().display()
    );
    let client = MockChatClient::with_replies(vec![text_reply(&fenced), text_reply("done")]);
    let registry = default_registry(60);
    let mut session = new_session();

    let runner = TurnRunner::new(&client, &registry, &store, 10, CancellationToken::new());
    runner.run(&mut session).await.unwrap();

    // system, user, assistant(JSON), tool, assistant("done")
    assert_eq!(session.messages.len(), 5);
    let tool_msg = &session.messages[3];
    assert_eq!(tool_msg.role, Role::Tool);
    assert_eq!(tool_msg.tool_call_id.as_deref(), Some(fallback_call_id("glob").as_str()));

    // 空目录 glob 是成功而非失败，输出 "No files found"
    let result: serde_json::Value = serde_json::from_str(&tool_msg.content).unwrap();
    assert_eq!(result["success"], true);
    assert_eq!(result["output"], "No files found");
    assert_eq!(session.messages[4].content, "done");
}

#[tokio::test]
async fn test_tool_batch_preserves_order_and_ids() {
    let (_dir, store) = temp_store();
    let workdir = tempfile::tempdir().unwrap();
    std::fs::write(workdir.path().join("a.txt"), "alpha").unwrap();
    let read_args = format!(
        r#"{{"file_path":"{}"}}"#,
        workdir.path().join("a.txt").display()
    );
    let glob_args = format!(
        r#"{{"pattern":"*.txt","path":"{}"}}"#,
        workdir.path().display()
    );
    let client = MockChatClient::with_replies(vec![
        structured_reply(
            "",
            vec![
                ("call_1", "glob", glob_args.as_str()),
                ("call_2", "read", read_args.as_str()),
            ],
        ),
        text_reply("all done"),
    ]);
    let registry = default_registry(60);
    let mut session = new_session();

    let runner = TurnRunner::new(&client, &registry, &store, 10, CancellationToken::new());
    runner.run(&mut session).await.unwrap();

    let tool_messages: Vec<_> = session
        .messages
        .iter()
        .filter(|m| m.role == Role::Tool)
        .collect();
    assert_eq!(tool_messages.len(), 2);
    assert_eq!(tool_messages[0].tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(tool_messages[1].tool_call_id.as_deref(), Some("call_2"));

    // 助手消息保留原始调用描述
    let assistant = session
        .messages
        .iter()
        .find(|m| m.tool_calls.is_some())
        .unwrap();
    let records = assistant.tool_calls.as_ref().unwrap();
    assert_eq!(records[0].name, "glob");
    assert_eq!(records[1].name, "read");
}

#[tokio::test]
async fn test_unknown_tool_skipped_rest_execute() {
    let (_dir, store) = temp_store();
    let workdir = tempfile::tempdir().unwrap();
    let glob_args = format!(
        r#"{{"pattern":"*.rs","path":"{}"}}"#,
        workdir.path().display()
    );
    let client = MockChatClient::with_replies(vec![
        structured_reply(
            "",
            vec![
                ("call_1", "teleport", "{}"),
                ("call_2", "glob", glob_args.as_str()),
            ],
        ),
        text_reply("done"),
    ]);
    let registry = default_registry(60);
    let mut session = new_session();

    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel();
    {
        let runner = TurnRunner::new(&client, &registry, &store, 10, CancellationToken::new())
            .with_event_tx(&event_tx);
        runner.run(&mut session).await.unwrap();
    }
    drop(event_tx);

    // 未知工具不产生 tool 消息，其余调用照常执行
    let tool_messages: Vec<_> = session
        .messages
        .iter()
        .filter(|m| m.role == Role::Tool)
        .collect();
    assert_eq!(tool_messages.len(), 1);
    assert_eq!(tool_messages[0].tool_call_id.as_deref(), Some("call_2"));

    let mut saw_unknown_warning = false;
    while let Ok(ev) = event_rx.try_recv() {
        if let TurnEvent::Warning(text) = ev {
            saw_unknown_warning |= text.contains("teleport");
        }
    }
    assert!(saw_unknown_warning);
}

#[tokio::test]
async fn test_iteration_cap_fails_closed() {
    let (_dir, store) = temp_store();
    let workdir = tempfile::tempdir().unwrap();
    let fenced = format!(
        "```json\n{{\"name\":\"glob\",\"arguments\":{{\"pattern\":\"*.x\",\"path\":\"{}\"}}}}\n```",
        workdir.path().display()
    );
    // 模型每轮都请求工具，超过上限后应停止而非死循环
    let replies = (0..5).map(|_| text_reply(&fenced)).collect();
    let client = MockChatClient::with_replies(replies);
    let registry = default_registry(60);
    let mut session = new_session();

    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel();
    {
        let runner = TurnRunner::new(&client, &registry, &store, 3, CancellationToken::new())
            .with_event_tx(&event_tx);
        runner.run(&mut session).await.unwrap();
    }
    drop(event_tx);

    let tool_count = session
        .messages
        .iter()
        .filter(|m| m.role == Role::Tool)
        .count();
    assert_eq!(tool_count, 3);

    let mut saw_cap_warning = false;
    while let Ok(ev) = event_rx.try_recv() {
        if let TurnEvent::Warning(text) = ev {
            saw_cap_warning |= text.contains("max iterations");
        }
    }
    assert!(saw_cap_warning);
}

#[tokio::test]
async fn test_session_persisted_after_tool_batch() {
    let (_dir, store) = temp_store();
    let workdir = tempfile::tempdir().unwrap();
    let fenced = format!(
        "```json\n{{\"name\":\"glob\",\"arguments\":{{\"pattern\":\"*\",\"path\":\"{}\"}}}}\n```",
        workdir.path().display()
    );
    let client = MockChatClient::with_replies(vec![text_reply(&fenced), text_reply("done")]);
    let registry = default_registry(60);
    let mut session = new_session();

    let runner = TurnRunner::new(&client, &registry, &store, 10, CancellationToken::new());
    runner.run(&mut session).await.unwrap();

    let loaded = store.get(&session.id).unwrap().unwrap();
    assert_eq!(loaded.model, session.model);
    // 最后一次落盘发生在工具批之后、最终文本回复之前
    assert!(loaded.messages.iter().any(|m| m.role == Role::Tool));
}

/// 始终返回传输错误的客户端
struct FailingClient;

#[async_trait]
impl ChatClient for FailingClient {
    async fn chat(
        &self,
        _messages: &[Message],
        _tools: Option<&[ToolSpec]>,
    ) -> Result<ChatReply, AgentError> {
        Err(AgentError::Llm("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_transport_failure_propagates() {
    let (_dir, store) = temp_store();
    let client = FailingClient;
    let registry = default_registry(60);
    let mut session = new_session();

    let runner = TurnRunner::new(&client, &registry, &store, 10, CancellationToken::new());
    let err = runner.run(&mut session).await.unwrap_err();
    assert!(matches!(err, AgentError::Llm(_)));
    // 失败前未追加任何消息，对话保持原样
    assert_eq!(session.messages.len(), 2);
}

#[tokio::test]
async fn test_cancelled_token_unwinds() {
    let (_dir, store) = temp_store();
    let client = MockChatClient::new();
    let registry = default_registry(60);
    let mut session = new_session();

    let token = CancellationToken::new();
    token.cancel();
    let runner = TurnRunner::new(&client, &registry, &store, 10, token);
    let err = runner.run(&mut session).await.unwrap_err();
    assert!(matches!(err, AgentError::Cancelled));
}
