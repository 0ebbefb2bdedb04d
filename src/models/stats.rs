//! # 统计快照数据模型
//!
//! 每次请求 `/api/statistics` 时由 `aggregator` 从磁盘重新计算，从不持久化。

use std::collections::BTreeMap;

use serde::Serialize;

/// 项目活跃度排名中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectActivity {
    pub id: String,
    pub name: String,
    pub messages: u64,
}

/// 全量统计快照
///
/// `daily_activity` 和 `hourly_activity` 对消息集合构成划分：
/// `total_messages == Σ daily_activity + undated_messages == Σ hourly_activity + undated_messages`。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_projects: u64,
    pub total_sessions: u64,
    pub total_messages: u64,
    /// `history.jsonl` 中的条目数
    pub total_history_entries: u64,
    /// 时间戳缺失或无法识别的消息数
    pub undated_messages: u64,
    /// `YYYY-MM-DD` → 消息数
    pub daily_activity: BTreeMap<String, u64>,
    /// 小时（0–23，全部 24 个都存在）→ 消息数
    pub hourly_activity: BTreeMap<u8, u64>,
    pub tool_usage: BTreeMap<String, u64>,
    pub model_usage: BTreeMap<String, u64>,
    /// 按消息数降序的前 10 个项目
    pub projects_by_activity: Vec<ProjectActivity>,
}
