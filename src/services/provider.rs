//! # AI 服务调用
//!
//! `CompletionProvider` 把"提示词 → 回复文本"抽象为一次黑盒调用，
//! 分析编排器只依赖这个 trait，测试时可替换为本地实现。
//!
//! `OpenAiCompatibleProvider` 调用 OpenAI 兼容的 `/chat/completions` 接口：
//! - 每次调用使用请求方传入的 `ProviderConfig`（不缓存配置）
//! - 整个请求受客户端超时约束，超时视为 `Provider` 错误
//! - 网络错误和非 2xx 响应不自动重试，直接返回给调用方

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::models::settings::ProviderConfig;

/// 错误信息中保留的响应体最大字符数
const ERROR_BODY_MAX_CHARS: usize = 300;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// 发送一条用户提示词，返回模型回复的文本
    async fn complete(&self, config: &ProviderConfig, prompt: &str) -> Result<String, AppError>;
}

/// OpenAI 兼容接口的 HTTP 实现
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("创建 HTTP 客户端失败: {e}")))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleProvider {
    async fn complete(&self, config: &ProviderConfig, prompt: &str) -> Result<String, AppError> {
        let url = chat_completions_url(&config.base_url);
        let body = json!({
            "model": config.model,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });

        log::info!("调用 AI 服务: {} (model = {})", url, config.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(describe_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(ERROR_BODY_MAX_CHARS).collect();
            return Err(AppError::Provider(format!("HTTP {status}: {snippet}")));
        }

        let value: Value = response.json().await.map_err(describe_request_error)?;
        extract_completion_text(&value)
    }
}

/// 补全 `/chat/completions` 路径；已经是完整地址时原样使用
pub fn chat_completions_url(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else {
        format!("{base}/chat/completions")
    }
}

fn describe_request_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::Provider(format!("请求超时: {e}"))
    } else if e.is_decode() {
        AppError::Provider(format!("响应解析失败: {e}"))
    } else {
        AppError::Provider(format!("请求失败: {e}"))
    }
}

/// 提取 `choices[0].message.content`
fn extract_completion_text(value: &Value) -> Result<String, AppError> {
    value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Provider("响应中没有回复文本 (choices[0].message.content)".into()))
}
