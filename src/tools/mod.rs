//! 工具箱：read / write / edit / glob / grep / bash 与注册表
//!
//! 工具集在进程启动时固定；新增工具 = 一个 Tool 实现 + 一次 register，回合执行器不变。

pub mod edit;
pub mod glob;
pub mod grep;
pub mod read;
pub mod registry;
pub mod schema;
pub mod shell;
pub mod write;

pub use edit::EditTool;
pub use glob::GlobTool;
pub use grep::GrepTool;
pub use read::ReadTool;
pub use registry::{Tool, ToolRegistry, ToolResult, ToolSpec};
pub use schema::tool_call_schema_json;
pub use shell::BashTool;
pub use write::WriteTool;

/// 构建固定的六工具注册表
pub fn default_registry(shell_timeout_secs: u64) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(ReadTool);
    registry.register(WriteTool);
    registry.register(EditTool);
    registry.register(GlobTool);
    registry.register(GrepTool);
    registry.register(BashTool::new(shell_timeout_secs));
    registry
}
