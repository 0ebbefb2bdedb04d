//! # Claude History Viewer - 服务端核心
//!
//! 本地 HTTP 服务，浏览、统计和分析 `~/.claude/` 下的 Claude Code 聊天记录：
//! - 项目 / 会话的列表、读取与删除
//! - 全量活跃度统计（按日、按小时、工具、模型、项目排名）
//! - 调用 OpenAI 兼容的 AI 服务分析用户偏好，生成 Markdown 报告
//!
//! ## 模块结构
//! - `commands/` - HTTP 接口层（axum handler 与路由）
//! - `models/` - 数据模型（序列化为前端使用的 JSON）
//! - `services/` - 核心业务逻辑（扫描、解析、统计、分析）
//! - `state` - handler 共享状态
//! - `utils/` - 通用工具函数

pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

#[cfg(test)]
mod test_support;

use tracing_subscriber::EnvFilter;

use error::AppError;
use models::settings::ViewerSettings;
use state::AppState;

/// 启动查看器服务并阻塞到进程收到退出信号
///
/// 1. 初始化日志（`RUST_LOG`，默认 `info`；`log` 宏经 tracing-log 桥接输出）
/// 2. 加载 `ViewerSettings`
/// 3. 创建多线程 tokio 运行时，监听 `host:port` 并提供 HTTP 服务
///
/// # 错误
/// 设置加载失败、端口被占用或运行时创建失败时返回错误
pub fn run() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| AppError::Internal(format!("初始化日志失败: {e}")))?;

    let settings = ViewerSettings::load()?;
    log::info!("Claude 数据目录: {}", settings.claude_dir.display());
    log::info!("查看器数据目录: {}", settings.data_dir.display());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(serve(settings))
}

async fn serve(settings: ViewerSettings) -> Result<(), AppError> {
    let addr = format!("{}:{}", settings.host, settings.port);
    let state = AppState::new(settings)?;
    let app = commands::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Claude History Viewer 已启动: http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("监听退出信号失败: {}", e);
        // 无法监听信号时保持运行，直到进程被外部终止
        std::future::pending::<()>().await;
    }
    log::info!("收到退出信号，正在关闭服务");
}
