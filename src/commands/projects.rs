//! # 项目和会话接口
//!
//! - `GET /api/projects` - 所有项目及会话数量
//! - `GET /api/projects/{id}/sessions` - 项目下的会话摘要
//! - `GET /api/projects/{id}/sessions/{sid}` - 会话的全部消息
//! - `DELETE /api/projects/{id}/sessions/{sid}` - 删除单个会话
//! - `DELETE /api/projects/{id}` - 删除整个项目
//!
//! 删除直接作用于 `~/.claude/projects/` 下的文件，不做备份。

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::models::project::{Project, SessionDetail, SessionSummary};
use crate::services::session_store;
use crate::state::AppState;

pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(session_store::list_projects(&state.scanner).await?))
}

/// 列出项目下的会话，最新的在前
///
/// # 错误
/// 项目不存在时返回 404
pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<SessionSummary>>, AppError> {
    Ok(Json(
        session_store::list_sessions(&state.scanner, &project_id).await?,
    ))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path((project_id, session_id)): Path<(String, String)>,
) -> Result<Json<SessionDetail>, AppError> {
    Ok(Json(
        session_store::fetch_session(&state.scanner, &project_id, &session_id).await?,
    ))
}

/// 删除单个会话文件
///
/// # 返回值
/// `{"deleted": <session_id>}`
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path((project_id, session_id)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    session_store::delete_session(&state.scanner, &project_id, &session_id).await?;
    Ok(Json(json!({ "deleted": session_id })))
}

/// 删除项目目录及其全部会话
///
/// # 返回值
/// `{"deleted": <project_id>}`
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    session_store::delete_project(&state.scanner, &project_id).await?;
    Ok(Json(json!({ "deleted": project_id })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/projects", get(list_projects))
        .route("/projects/{id}", delete(delete_project))
        .route("/projects/{id}/sessions", get(list_sessions))
        .route(
            "/projects/{id}/sessions/{sid}",
            get(get_session).delete(delete_session),
        )
}
