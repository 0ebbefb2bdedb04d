//! # 分析报告数据模型

use serde::Serialize;

/// 报告文件元数据，用于 `/api/reports` 列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportInfo {
    /// 报告文件名（如 "-home-user-app__s1__20261019-101500.md"）
    pub filename: String,
    /// 文件大小（字节）
    pub size: u64,
    /// 最后修改时间（ISO 8601，UTC）
    pub created_at: String,
}

/// 单个报告的完整内容，用于 `/api/reports/{filename}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportContent {
    pub filename: String,
    pub content: String,
}

/// 一次分析的结果：新报告的元数据和转录文本的截断情况
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisOutcome {
    pub report: ReportInfo,
    pub included_messages: usize,
    pub omitted_messages: usize,
    pub truncated: bool,
}
