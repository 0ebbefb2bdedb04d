//! # 设置和配置数据模型
//!
//! - `ProviderConfig`：AI 服务配置，对应 `<data_dir>/config.json`
//! - `ProviderConfigUpdate`：`POST /api/config` 请求体，字段可缺失以便校验
//! - `ProviderConfigView`：`GET /api/config` 响应体，API Key 脱敏
//! - `ViewerSettings`：查看器运行设置（监听地址、数据目录、超时、转录预算）

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::utils::path;

/// AI 服务配置
///
/// 三个字段均为必填。每次分析请求开始时从磁盘重新加载，
/// 显式传给分析编排器，不存在进程级全局配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    /// OpenAI 兼容接口的基础地址，如 "https://api.openai.com/v1"
    pub base_url: String,
    pub model: String,
}

impl ProviderConfig {
    /// 三个字段都非空白时视为完整配置
    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty()
            && !self.base_url.trim().is_empty()
            && !self.model.trim().is_empty()
    }
}

/// `POST /api/config` 请求体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfigUpdate {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl ProviderConfigUpdate {
    /// 校验并转换为完整配置
    ///
    /// 任一字段缺失或为空白时返回 `Validation`，错误信息列出所有缺失字段。
    pub fn validate(self) -> Result<ProviderConfig, AppError> {
        fn present(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        let api_key = present(self.api_key);
        let base_url = present(self.base_url);
        let model = present(self.model);

        let missing: Vec<&str> = [
            ("api_key", api_key.is_none()),
            ("base_url", base_url.is_none()),
            ("model", model.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        match (api_key, base_url, model) {
            (Some(api_key), Some(base_url), Some(model)) => Ok(ProviderConfig {
                api_key,
                base_url,
                model,
            }),
            _ => Err(AppError::Validation(format!(
                "缺少必填字段: {}",
                missing.join(", ")
            ))),
        }
    }
}

/// `GET /api/config` 响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderConfigView {
    pub configured: bool,
    pub base_url: String,
    pub model: String,
    /// 脱敏后的 API Key：仅保留前 4 位和后 4 位
    pub api_key: String,
}

impl ProviderConfigView {
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            base_url: String::new(),
            model: String::new(),
            api_key: String::new(),
        }
    }
}

impl From<&ProviderConfig> for ProviderConfigView {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            configured: config.is_complete(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            api_key: mask_secret(&config.api_key),
        }
    }
}

fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}****{tail}")
}

/// 查看器运行设置
///
/// 解析顺序：默认值 → `<data_dir>/settings.json` → 环境变量
/// （`CHV_CLAUDE_DIR`、`CHV_DATA_DIR`、`CHV_HOST`、`CHV_PORT`）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub host: String,
    pub port: u16,
    /// Claude Code 数据目录（只读）
    pub claude_dir: PathBuf,
    /// 查看器自身数据目录：config.json、reports/、prompt_template.md
    pub data_dir: PathBuf,
    /// 静态前端目录，不存在时只提供 API
    pub static_dir: PathBuf,
    /// AI 服务调用超时（秒）
    pub provider_timeout_secs: u64,
    /// 发送给 AI 服务的转录文本最大字符数
    pub transcript_max_chars: usize,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            claude_dir: path::default_claude_dir().unwrap_or_else(|_| PathBuf::from(".claude")),
            data_dir: path::default_data_dir()
                .unwrap_or_else(|_| PathBuf::from(".claude-history-viewer")),
            static_dir: PathBuf::from("static"),
            provider_timeout_secs: 60,
            transcript_max_chars: 120_000,
        }
    }
}

impl ViewerSettings {
    pub const FILE_NAME: &'static str = "settings.json";

    /// `transcript_max_chars` 的下限，保证截断后至少能放下省略标记和一段消息
    pub const MIN_TRANSCRIPT_CHARS: usize = 1_000;

    /// 从进程环境加载设置
    pub fn load() -> Result<Self, AppError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// 使用给定的环境变量查询函数加载设置
    ///
    /// `CHV_DATA_DIR` 决定到哪里找 settings.json，
    /// 其余环境变量在读取文件之后覆盖文件中的值。
    pub fn load_with(env: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let data_dir = match env("CHV_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => path::default_data_dir()?,
        };

        let mut settings = Self::read_file(&data_dir.join(Self::FILE_NAME))?;
        settings.data_dir = data_dir;

        if let Some(dir) = env("CHV_CLAUDE_DIR") {
            settings.claude_dir = PathBuf::from(dir);
        }
        if let Some(host) = env("CHV_HOST") {
            settings.host = host;
        }
        if let Some(port) = env("CHV_PORT") {
            settings.port = port
                .trim()
                .parse()
                .map_err(|_| AppError::Validation(format!("CHV_PORT 不是合法端口: {port}")))?;
        }

        if settings.transcript_max_chars < Self::MIN_TRANSCRIPT_CHARS {
            return Err(AppError::Validation(format!(
                "transcript_max_chars 不能小于 {}，当前为 {}",
                Self::MIN_TRANSCRIPT_CHARS,
                settings.transcript_max_chars
            )));
        }

        Ok(settings)
    }

    /// 读取设置文件；文件不存在时返回默认设置
    fn read_file(file: &Path) -> Result<Self, AppError> {
        match std::fs::read_to_string(file) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir.join("reports")
    }

    pub fn prompt_template_file(&self) -> PathBuf {
        self.data_dir.join("prompt_template.md")
    }
}
