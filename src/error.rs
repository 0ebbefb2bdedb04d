//! # 统一错误类型
//!
//! 所有服务层函数返回 `Result<T, AppError>`，HTTP 层通过 `IntoResponse`
//! 将错误映射为状态码和 JSON 响应体：
//!
//! | 变体 | HTTP 状态码 |
//! |---|---|
//! | `NotFound` | 404 |
//! | `Validation` / `ConfigMissing` | 400 |
//! | `Provider` | 502 |
//! | `Io` / `Json` / `Internal` | 500 |
//!
//! 单行 JSON 解析失败不属于此处的错误：解析器在本地跳过并记录日志。

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// 项目、会话或报告不存在
    #[error("未找到: {0}")]
    NotFound(String),

    /// 请求参数或请求体不合法
    #[error("参数校验失败: {0}")]
    Validation(String),

    /// 尚未配置 AI 服务（config.json 不存在或字段不完整）
    #[error("尚未配置 AI 服务，请先保存 api_key / base_url / model")]
    ConfigMissing,

    /// AI 服务调用失败：网络错误、超时或非 2xx 响应
    #[error("AI 服务调用失败: {0}")]
    Provider(String),

    #[error("文件操作失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 处理失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// 错误种类标识，写入响应体的 `error` 字段
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation_error",
            Self::ConfigMissing => "config_missing",
            Self::Provider(_) => "provider_error",
            Self::Io(_) | Self::Json(_) | Self::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::ConfigMissing => StatusCode::BAD_REQUEST,
            Self::Provider(_) => StatusCode::BAD_GATEWAY,
            Self::Io(_) | Self::Json(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 将文件系统错误转换为 `AppError`，`ErrorKind::NotFound` 映射为 `NotFound(what)`
    ///
    /// 读取与删除并发时文件可能在两次系统调用之间消失，
    /// 此时应作为普通的 404 返回，而不是 500。
    pub fn from_io(err: std::io::Error, what: impl Into<String>) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound(what.into())
        } else {
            Self::Io(err)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("API 错误: {} - {}", status, self);
        } else {
            log::warn!("API 错误: {} - {}", status, self);
        }

        let body = json!({
            "error": self.kind(),
            "detail": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
