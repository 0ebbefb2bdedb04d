//! # 消息数据模型
//!
//! 会话 JSONL 文件的每一行是一条原始记录（`RawRecord`），
//! 其中 `type` 为 `user` 或 `assistant` 的记录经 `transformer` 转换为 `Message`。
//!
//! 原始记录保持为 `serde_json::Value`，避免因 Claude Code 版本升级
//! 添加新字段而导致反序列化失败。

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 会话 JSONL 文件中的一行原始记录
pub type RawRecord = Value;

/// `~/.claude/history.jsonl` 中的一行记录
///
/// 仅用于分页展示和计数，不做强类型解析。
pub type HistoryEntry = Value;

/// 消息角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Assistant,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// 消息中嵌入的一次工具调用（`tool_use` 内容块）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolUse {
    /// 工具名称，如 "Bash"、"Read"；缺失时不计入工具统计
    pub name: Option<String>,
    /// 简短描述：命令前 100 字符、文件路径或搜索模式
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// 一条会话消息
///
/// 由原始记录转换而来，`content` 已渲染为纯文本
/// （文本块、思考过程、工具调用摘要、截断后的工具结果）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageKind,

    pub content: String,

    /// 原始时间戳（通常为 ISO 8601 字符串），保持原样
    #[serde(default)]
    pub timestamp: Option<Value>,

    #[serde(default)]
    pub uuid: Option<String>,

    /// 消息发送时 Claude Code 的工作目录
    #[serde(default)]
    pub cwd: String,

    /// AI 模型标识符（仅 assistant 消息有值）
    #[serde(default)]
    pub model: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_uses: Vec<ToolUse>,
}

impl Message {
    /// 时间戳的字符串形式，数字时间戳转换为十进制文本
    pub fn timestamp_text(&self) -> Option<String> {
        match self.timestamp.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
