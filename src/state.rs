//! # 共享请求状态
//!
//! 所有 handler 通过 `State<Arc<AppState>>` 访问。状态只包含路径、扫描器和
//! AI 服务客户端，不缓存任何会话数据，也不持有 AI 服务配置：
//! 配置在每次分析请求开始时从磁盘读取。

use std::sync::Arc;
use std::time::Duration;

use crate::error::AppError;
use crate::models::settings::ViewerSettings;
use crate::services::config_store::ConfigStore;
use crate::services::provider::{CompletionProvider, OpenAiCompatibleProvider};
use crate::services::report_store::ReportStore;
use crate::services::scanner::Scanner;

pub struct AppState {
    pub settings: ViewerSettings,
    pub scanner: Scanner,
    pub reports: ReportStore,
    pub configs: ConfigStore,
    pub provider: Arc<dyn CompletionProvider>,
}

impl AppState {
    /// 使用 OpenAI 兼容的 HTTP 客户端构建状态
    pub fn new(settings: ViewerSettings) -> Result<Arc<Self>, AppError> {
        let provider = OpenAiCompatibleProvider::new(Duration::from_secs(
            settings.provider_timeout_secs,
        ))?;
        Ok(Self::with_provider(settings, Arc::new(provider)))
    }

    /// 指定 AI 服务实现构建状态（测试中替换为本地实现）
    pub fn with_provider(
        settings: ViewerSettings,
        provider: Arc<dyn CompletionProvider>,
    ) -> Arc<Self> {
        Arc::new(Self {
            scanner: Scanner::new(&settings.claude_dir),
            reports: ReportStore::new(settings.reports_dir()),
            configs: ConfigStore::new(settings.config_file()),
            provider,
            settings,
        })
    }
}
