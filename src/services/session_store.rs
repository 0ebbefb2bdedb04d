//! # 会话存储服务
//!
//! 在 `Scanner` 之上提供项目和会话的列表、读取、删除操作。
//!
//! 删除操作直接作用于磁盘，不可撤销：
//! - 删除会话：移除单个 `.jsonl` 文件
//! - 删除项目：递归移除整个项目目录；任何一步失败都作为错误返回，
//!   已删除的文件不会回滚

use crate::error::AppError;
use crate::models::project::{Project, SessionDetail, SessionSummary};
use crate::services::scanner::Scanner;

pub async fn list_projects(scanner: &Scanner) -> Result<Vec<Project>, AppError> {
    scanner.list_projects().await
}

/// 列出项目下的会话摘要
///
/// 读取每个会话文件统计消息数和首尾时间戳，
/// 按最后时间戳降序排列（最新的会话在前），时间戳相同时按会话 ID 排序。
///
/// # 错误
/// 项目不存在时返回 `NotFound`
pub async fn list_sessions(
    scanner: &Scanner,
    project_id: &str,
) -> Result<Vec<SessionSummary>, AppError> {
    let mut sessions = Vec::new();

    for session in scanner.session_refs(Some(project_id)).await? {
        let what = format!("会话 {}/{}", session.project_id, session.session_id);
        let messages = match scanner.read_session_file(&session.path, &what).await {
            Ok(messages) => messages,
            // 列表过程中被并发删除的会话直接跳过
            Err(AppError::NotFound(_)) => continue,
            Err(e) => return Err(e),
        };

        let mut timestamps = messages.iter().filter_map(|m| m.timestamp_text());
        let first_timestamp = timestamps.next();
        let last_timestamp = timestamps.last().or_else(|| first_timestamp.clone());

        sessions.push(SessionSummary {
            id: session.session_id,
            file: session.path.to_string_lossy().to_string(),
            message_count: messages.len(),
            first_timestamp,
            last_timestamp,
        });
    }

    sessions.sort_by(|a, b| {
        b.last_timestamp
            .cmp(&a.last_timestamp)
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(sessions)
}

/// 读取会话详情
///
/// 内容为空的消息（如只包含空白文本的记录）不返回给前端。
pub async fn fetch_session(
    scanner: &Scanner,
    project_id: &str,
    session_id: &str,
) -> Result<SessionDetail, AppError> {
    let messages = scanner.read_session(project_id, session_id).await?;
    let source_file = scanner.session_file(project_id, session_id)?;

    Ok(SessionDetail {
        messages: messages
            .into_iter()
            .filter(|m| !m.content.trim().is_empty())
            .collect(),
        source_file: source_file.to_string_lossy().to_string(),
        project_id: project_id.to_string(),
        session_id: session_id.to_string(),
    })
}

/// 删除指定的会话文件
///
/// # 错误
/// 项目或会话不存在时返回 `NotFound`
pub async fn delete_session(
    scanner: &Scanner,
    project_id: &str,
    session_id: &str,
) -> Result<(), AppError> {
    let file = scanner.session_file(project_id, session_id)?;
    tokio::fs::remove_file(&file)
        .await
        .map_err(|e| AppError::from_io(e, format!("会话 {project_id}/{session_id}")))?;

    log::info!("已删除会话 {}/{}", project_id, session_id);
    Ok(())
}

/// 删除整个项目目录及其全部会话
///
/// # 错误
/// 项目不存在时返回 `NotFound`；删除过程中任何文件删除失败
/// （如权限不足）都返回错误，此时项目可能已被部分删除
pub async fn delete_project(scanner: &Scanner, project_id: &str) -> Result<(), AppError> {
    let dir = scanner.existing_project_dir(project_id).await?;
    tokio::fs::remove_dir_all(&dir).await.map_err(|e| {
        log::error!("删除项目 {} 失败，目录可能已被部分删除: {}", project_id, e);
        AppError::from_io(e, format!("项目 {project_id}"))
    })?;

    log::info!("已删除项目 {}", project_id);
    Ok(())
}
