//! # HTTP 接口层
//!
//! 每个子模块对应一个功能域，各自提供 `router()`，在这里合并：
//! - `projects` - 项目和会话的列表、读取、删除
//! - `statistics` - 全量统计
//! - `settings` - AI 服务配置读写、命令历史分页
//! - `analysis` - 会话 / 项目偏好分析
//! - `reports` - 分析报告的列表、读取、删除
//!
//! 静态前端目录存在时作为兜底路由提供，否则只暴露 `/api/*`。

use std::sync::Arc;

use axum::Router;
use tower_http::services::ServeDir;

use crate::state::AppState;

pub mod analysis;
pub mod projects;
pub mod reports;
pub mod settings;
pub mod statistics;

/// 构建完整的 HTTP 路由
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(projects::router())
        .merge(statistics::router())
        .merge(settings::router())
        .merge(analysis::router())
        .merge(reports::router());

    let app = Router::new().nest("/api", api);

    let static_dir = &state.settings.static_dir;
    let app = if static_dir.is_dir() {
        log::info!("静态前端目录: {}", static_dir.display());
        app.fallback_service(ServeDir::new(static_dir))
    } else {
        log::warn!("静态前端目录 {} 不存在，仅提供 API", static_dir.display());
        app
    };

    app.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ClaudeFixture, RecordingProvider, send, test_state};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_static_dir_served_when_present() {
        let fixture = ClaudeFixture::new();
        let static_dir = fixture.data_dir().join("static");
        std::fs::create_dir_all(&static_dir).unwrap();
        std::fs::write(static_dir.join("index.html"), "\"viewer\"").unwrap();
        let state = test_state(&fixture, Arc::new(RecordingProvider::ok("x")));

        let (status, body) = send(router(state.clone()), "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "viewer");

        let (status, _) = send(router(state), "GET", "/missing.js", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_without_static_dir_only_api() {
        let fixture = ClaudeFixture::new();
        let state = test_state(&fixture, Arc::new(RecordingProvider::ok("x")));
        let (status, _) = send(router(state.clone()), "GET", "/", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(router(state), "GET", "/api/projects", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!([]));
    }
}
