//! # JSONL 解析服务
//!
//! 逐行解析 Claude Code 的 JSONL 文件（会话文件和 history.jsonl）。
//!
//! ## 容错策略
//! - 一次性读取整个文件到字节缓冲区，非法 UTF-8 字节按替换字符处理
//! - 解析失败的行（如被截断的末行）跳过并记录 warn 日志，不影响其余行
//! - 空行直接忽略

use std::path::Path;

use crate::error::AppError;
use crate::models::message::{HistoryEntry, RawRecord};

/// 读取并解析 JSONL 会话文件中的所有记录
///
/// # 参数
/// - `file_path` - 会话 JSONL 文件路径
/// - `what` - 文件不存在时写入 `NotFound` 的描述（如 "会话 p1/s1"）
///
/// # 返回值
/// 按文件顺序排列的原始记录
///
/// # 错误
/// 文件不存在（包括读取前被并发删除）返回 `NotFound`，其他读取失败返回 `Io`
pub async fn read_records(file_path: &Path, what: &str) -> Result<Vec<RawRecord>, AppError> {
    let bytes = tokio::fs::read(file_path)
        .await
        .map_err(|e| AppError::from_io(e, what))?;

    Ok(parse_jsonl(&String::from_utf8_lossy(&bytes), file_path))
}

/// 读取 `history.jsonl`；文件不存在时返回空数组
pub async fn read_history(file_path: &Path) -> Result<Vec<HistoryEntry>, AppError> {
    match tokio::fs::read(file_path).await {
        Ok(bytes) => Ok(parse_jsonl(&String::from_utf8_lossy(&bytes), file_path)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(vec![]),
        Err(e) => Err(AppError::Io(e)),
    }
}

/// 逐行解析 JSONL 文本，跳过空行和无法解析的行
fn parse_jsonl(content: &str, source: &Path) -> Vec<serde_json::Value> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match serde_json::from_str(line.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!(
                    "跳过无法解析的行 {}:{}: {}",
                    source.display(),
                    index + 1,
                    e
                );
                None
            }
        })
        .collect()
}
