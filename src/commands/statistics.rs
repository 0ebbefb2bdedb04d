//! # 统计接口
//!
//! `GET /api/statistics` 每次请求都完整扫描一遍 `~/.claude/projects/`，
//! 不缓存结果。

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::AppError;
use crate::models::stats::Statistics;
use crate::services::aggregator;
use crate::state::AppState;

pub async fn get_statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Statistics>, AppError> {
    let stats = aggregator::compute(&state.scanner).await?;
    log::debug!(
        "统计完成: {} 个项目, {} 个会话, {} 条消息",
        stats.total_projects,
        stats.total_sessions,
        stats.total_messages
    );
    Ok(Json(stats))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/statistics", get(get_statistics))
}

#[cfg(test)]
mod tests {
    use crate::commands::router;
    use crate::test_support::{
        ClaudeFixture, RecordingProvider, assistant_tool, send, test_state, user_text,
    };
    use axum::http::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_statistics_snapshot() {
        let fixture = ClaudeFixture::new();
        fixture.session(
            "p1",
            "s1",
            &[
                user_text("list files", "2025-01-01T09:00:00Z"),
                assistant_tool("bash", "2025-01-01T09:00:02Z"),
                user_text("thanks", "2025-01-02T18:30:00Z"),
            ],
        );
        fixture.session("p1", "s2", &[]);
        fixture.history(&[json!({"display": "/help"}), json!({"display": "ls"})]);
        let state = test_state(&fixture, Arc::new(RecordingProvider::ok("x")));

        let (status, body) = send(router(state), "GET", "/api/statistics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_projects"], 1);
        assert_eq!(body["total_sessions"], 2);
        assert_eq!(body["total_messages"], 3);
        assert_eq!(body["total_history_entries"], 2);
        assert_eq!(body["undated_messages"], 0);
        assert_eq!(body["tool_usage"], json!({"bash": 1}));
        assert_eq!(body["model_usage"], json!({"claude-sonnet-4": 1}));
        assert_eq!(
            body["daily_activity"],
            json!({"2025-01-01": 2, "2025-01-02": 1})
        );
        assert_eq!(body["hourly_activity"]["9"], 2);
        assert_eq!(body["hourly_activity"]["18"], 1);
        assert_eq!(body["hourly_activity"]["0"], 0);
        assert_eq!(
            body["projects_by_activity"],
            json!([{"id": "p1", "name": "p1", "messages": 3}])
        );
    }

    #[tokio::test]
    async fn test_empty_claude_dir() {
        let fixture = ClaudeFixture::new();
        let state = test_state(&fixture, Arc::new(RecordingProvider::ok("x")));
        let (status, body) = send(router(state), "GET", "/api/statistics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_messages"], 0);
        assert_eq!(body["hourly_activity"].as_object().unwrap().len(), 24);
    }
}
