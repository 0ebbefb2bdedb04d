//! 测试夹具：在临时目录中构造 `~/.claude` 和查看器数据目录，
//! 以及驱动 HTTP 接口的辅助函数

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::error::AppError;
use crate::models::settings::{ProviderConfig, ViewerSettings};
use crate::services::provider::CompletionProvider;
use crate::state::AppState;

pub struct ClaudeFixture {
    root: TempDir,
}

impl ClaudeFixture {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("claude")).unwrap();
        std::fs::create_dir_all(root.path().join("data")).unwrap();
        Self { root }
    }

    pub fn claude_dir(&self) -> PathBuf {
        self.root.path().join("claude")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.path().join("data")
    }

    /// 写入一个会话文件，每条记录一行
    pub fn session(&self, project: &str, session: &str, records: &[Value]) -> PathBuf {
        let content: String = records.iter().map(|r| format!("{r}\n")).collect();
        self.file(&format!("{project}/{session}.jsonl"), &content)
    }

    /// 在 `projects/` 下写入任意文件
    pub fn file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.claude_dir().join("projects").join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn history(&self, entries: &[Value]) {
        let content: String = entries.iter().map(|r| format!("{r}\n")).collect();
        std::fs::write(self.claude_dir().join("history.jsonl"), content).unwrap();
    }
}

pub fn user_text(text: &str, timestamp: &str) -> Value {
    json!({
        "type": "user",
        "uuid": format!("u-{timestamp}"),
        "timestamp": timestamp,
        "cwd": "/home/me/app",
        "message": {"role": "user", "content": text}
    })
}

pub fn assistant_tool(tool: &str, timestamp: &str) -> Value {
    json!({
        "type": "assistant",
        "uuid": format!("a-{timestamp}"),
        "timestamp": timestamp,
        "message": {
            "role": "assistant",
            "model": "claude-sonnet-4",
            "content": [
                {"type": "text", "text": "on it"},
                {"type": "tool_use", "id": "t1", "name": tool, "input": {"command": "ls"}}
            ]
        }
    })
}

/// 记录收到的提示词并返回固定回复的 AI 服务
pub struct RecordingProvider {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingProvider {
    pub fn ok(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(vec![]),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            reply: Err(msg.to_string()),
            prompts: Mutex::new(vec![]),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionProvider for RecordingProvider {
    async fn complete(&self, _config: &ProviderConfig, prompt: &str) -> Result<String, AppError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(AppError::Provider)
    }
}

/// 指向夹具目录的共享状态
pub fn test_state(fixture: &ClaudeFixture, provider: Arc<dyn CompletionProvider>) -> Arc<AppState> {
    let settings = ViewerSettings {
        claude_dir: fixture.claude_dir(),
        data_dir: fixture.data_dir(),
        static_dir: fixture.data_dir().join("static"),
        ..ViewerSettings::default()
    };
    AppState::with_provider(settings, provider)
}

/// 发送一个请求，返回状态码和解析后的 JSON 响应体（空响应体为 `Null`）
pub async fn send(app: Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body)),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };
    (status, value)
}
