//! 回合事件
//!
//! 回合执行器不直接打印：所有用户可见输出通过可选的事件通道推送，
//! CLI 侧挂控制台渲染器，测试侧挂通道或不挂（无头运行）。

use tokio::sync::mpsc::UnboundedSender;

/// 工具输出在事件里的预览长度（字符）；完整输出始终写入对话
pub const TOOL_OUTPUT_PREVIEW_CHARS: usize = 500;

/// 一个回合内推送给前端的事件
#[derive(Debug, Clone)]
pub enum TurnEvent {
    /// 模型自然语言输出（工具调用标记已剥离）
    AssistantText(String),
    /// 即将执行工具
    ToolStart { name: String },
    /// 工具执行完毕（output 为预览截断）
    ToolResult {
        title: String,
        output: String,
        success: bool,
    },
    /// 警告：未知工具、模型不支持工具调用、迭代上限等
    Warning(String),
}

pub(crate) fn send_event(tx: &Option<&UnboundedSender<TurnEvent>>, ev: TurnEvent) {
    if let Some(t) = tx {
        let _ = t.send(ev);
    }
}

/// 截断到预览长度，超出时追加省略号
pub(crate) fn preview(text: &str) -> String {
    let truncated: String = text.chars().take(TOOL_OUTPUT_PREVIEW_CHARS).collect();
    if text.chars().count() > TOOL_OUTPUT_PREVIEW_CHARS {
        format!("{}...", truncated)
    } else {
        truncated
    }
}
