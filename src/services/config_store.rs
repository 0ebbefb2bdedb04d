//! # AI 服务配置存储
//!
//! 配置保存在 `<data_dir>/config.json`，键为 `api_key` / `base_url` / `model`。
//! 更新时整体覆盖（不做字段合并），先写临时文件再重命名，
//! 写入中途失败不会留下半个配置文件。

use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::models::settings::{ProviderConfig, ProviderConfigUpdate, ProviderConfigView};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    file: PathBuf,
}

impl ConfigStore {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn path(&self) -> &Path {
        &self.file
    }

    /// 读取配置文件
    ///
    /// # 返回值
    /// 文件不存在或内容无法解析时返回 `None`（后者记录 warn 日志）
    pub async fn load(&self) -> Result<Option<ProviderConfig>, AppError> {
        let content = match tokio::fs::read_to_string(&self.file).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::Io(e)),
        };

        match serde_json::from_str::<ProviderConfig>(&content) {
            Ok(config) => Ok(Some(config)),
            Err(e) => {
                log::warn!("配置文件 {} 无法解析，视为未配置: {}", self.file.display(), e);
                Ok(None)
            }
        }
    }

    /// 读取完整配置，供分析请求使用
    ///
    /// # 错误
    /// 未配置或字段不完整时返回 `ConfigMissing`
    pub async fn require(&self) -> Result<ProviderConfig, AppError> {
        self.load()
            .await?
            .filter(ProviderConfig::is_complete)
            .ok_or(AppError::ConfigMissing)
    }

    /// `GET /api/config` 的脱敏视图
    pub async fn view(&self) -> Result<ProviderConfigView, AppError> {
        Ok(self
            .load()
            .await?
            .as_ref()
            .map(ProviderConfigView::from)
            .unwrap_or_else(ProviderConfigView::unconfigured))
    }

    /// 校验并整体覆盖配置文件
    ///
    /// # 错误
    /// 字段缺失时返回 `Validation`，此时不触碰已有的配置文件
    pub async fn update(&self, update: ProviderConfigUpdate) -> Result<ProviderConfigView, AppError> {
        let config = update.validate()?;
        self.save(&config).await?;
        log::info!("已保存 AI 服务配置 (model = {})", config.model);
        Ok(ProviderConfigView::from(&config))
    }

    async fn save(&self, config: &ProviderConfig) -> Result<(), AppError> {
        if let Some(parent) = self.file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(config)?;
        let tmp = self.file.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.file).await {
            tokio::fs::remove_file(&tmp).await.ok();
            return Err(AppError::Io(e));
        }
        Ok(())
    }
}
