//! # 偏好分析接口
//!
//! - `POST /api/analyze/{id}/sessions/{sid}` - 分析单个会话
//! - `POST /api/analyze/{id}` - 分析整个项目
//!
//! 每次请求先从磁盘读取 AI 服务配置，再交给 `Analyzer`；
//! 成功时返回新报告的信息和转录截断情况。

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};

use crate::error::AppError;
use crate::models::report::AnalysisOutcome;
use crate::services::analysis::Analyzer;
use crate::state::AppState;

pub async fn analyze_session(
    State(state): State<Arc<AppState>>,
    Path((project_id, session_id)): Path<(String, String)>,
) -> Result<Json<AnalysisOutcome>, AppError> {
    run_analysis(&state, &project_id, Some(&session_id)).await
}

pub async fn analyze_project(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Result<Json<AnalysisOutcome>, AppError> {
    run_analysis(&state, &project_id, None).await
}

/// # 错误
/// - 未配置 AI 服务时返回 `ConfigMissing`，不检查项目是否存在
/// - 其余错误见 `Analyzer::analyze`
async fn run_analysis(
    state: &AppState,
    project_id: &str,
    session_id: Option<&str>,
) -> Result<Json<AnalysisOutcome>, AppError> {
    let config = state.configs.require().await?;
    let template_file = state.settings.prompt_template_file();

    let analyzer = Analyzer {
        scanner: &state.scanner,
        reports: &state.reports,
        provider: state.provider.as_ref(),
        template_file: &template_file,
        transcript_max_chars: state.settings.transcript_max_chars,
    };
    let outcome = analyzer.analyze(&config, project_id, session_id).await?;
    Ok(Json(outcome))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analyze/{id}", post(analyze_project))
        .route("/analyze/{id}/sessions/{sid}", post(analyze_session))
}
