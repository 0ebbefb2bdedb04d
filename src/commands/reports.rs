//! # 分析报告接口
//!
//! - `GET /api/reports` - 报告列表，最新的在前
//! - `GET /api/reports/{filename}` - 报告全文
//! - `DELETE /api/reports/{filename}` - 删除报告

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::models::report::{ReportContent, ReportInfo};
use crate::state::AppState;

pub async fn list_reports(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ReportInfo>>, AppError> {
    Ok(Json(state.reports.list().await?))
}

pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<ReportContent>, AppError> {
    Ok(Json(state.reports.read(&filename).await?))
}

/// # 返回值
/// `{"deleted": <filename>}`
pub async fn delete_report(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.reports.delete(&filename).await?;
    Ok(Json(json!({ "deleted": filename })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reports", get(list_reports))
        .route("/reports/{filename}", get(get_report).delete(delete_report))
}
