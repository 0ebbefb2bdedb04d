//! # 设置和历史接口
//!
//! - `GET /api/config` - AI 服务配置（API Key 脱敏）
//! - `POST /api/config` - 整体覆盖 AI 服务配置
//! - `GET /api/history?limit&offset` - 分页读取 `~/.claude/history.jsonl`

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::models::message::HistoryEntry;
use crate::models::settings::{ProviderConfigUpdate, ProviderConfigView};
use crate::state::AppState;

/// 历史记录默认每页条数
const DEFAULT_HISTORY_LIMIT: usize = 100;

pub async fn get_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProviderConfigView>, AppError> {
    Ok(Json(state.configs.view().await?))
}

/// 保存 AI 服务配置
///
/// 请求体必须是包含 `api_key`、`base_url`、`model` 三个非空字符串的 JSON 对象。
/// 校验失败时返回 400，已有的配置文件保持不变。
pub async fn save_config(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ProviderConfigView>, AppError> {
    let Json(body) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    if !body.is_object() {
        return Err(AppError::Validation("请求体必须是 JSON 对象".into()));
    }
    let update: ProviderConfigUpdate =
        serde_json::from_value(body).map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(Json(state.configs.update(update).await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistoryPage {
    pub items: Vec<HistoryEntry>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// 分页读取命令历史
///
/// `history.jsonl` 不存在时返回空页。
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryPage>, AppError> {
    let Query(query) = query.map_err(|e| AppError::Validation(e.body_text()))?;
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let offset = query.offset.unwrap_or(0);

    let history = state.scanner.read_history().await?;
    let total = history.len();
    let items = history.into_iter().skip(offset).take(limit).collect();

    Ok(Json(HistoryPage {
        items,
        total,
        limit,
        offset,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/config", get(get_config).post(save_config))
        .route("/history", get(get_history))
}
