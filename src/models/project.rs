//! # 项目和会话数据模型
//!
//! 定义了项目（Project）和会话摘要（SessionSummary）的 Rust 结构体，
//! 通过 `Serialize` 直接作为 `/api/projects` 系列接口的响应体。

use serde::{Deserialize, Serialize};

use crate::models::message::Message;

/// 项目数据结构
///
/// 表示一个 Claude Code 项目，对应 `~/.claude/projects/` 下的一个子目录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// 项目 ID：编码后的目录名（如 "G--ClaudeProjects-Test"）
    pub id: String,

    /// 项目名称：解码还原后的原始路径（如 "G:\ClaudeProjects\Test"）
    pub name: String,

    /// 项目目录在磁盘上的绝对路径
    pub path: String,

    /// 该项目下的会话文件数量
    pub session_count: usize,
}

/// 会话摘要
///
/// 表示一次独立的 Claude Code 对话会话，对应一个 `.jsonl` 文件。
/// 时间戳取自会话内第一条和最后一条带时间戳的消息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// 会话 ID：文件名去掉 `.jsonl` 扩展名，通常是 UUID
    pub id: String,

    /// JSONL 文件的完整路径
    pub file: String,

    /// user / assistant 消息数量
    pub message_count: usize,

    #[serde(default)]
    pub first_timestamp: Option<String>,

    #[serde(default)]
    pub last_timestamp: Option<String>,
}

/// 会话详情：`GET /api/projects/{id}/sessions/{sid}` 响应体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionDetail {
    pub messages: Vec<Message>,
    pub source_file: String,
    pub project_id: String,
    pub session_id: String,
}
