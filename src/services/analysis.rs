//! # 偏好分析编排
//!
//! 一次分析的完整流程：
//! 1. 构建会话或整个项目的转录文本（按字符预算截断）
//! 2. 加载提示词模板（`<data_dir>/prompt_template.md`，不存在时使用内置模板）
//! 3. 用本次请求加载的 `ProviderConfig` 调用 AI 服务
//! 4. 将回复原文写入一份新报告
//!
//! 任何一步失败都直接返回错误，不会写入报告；成功时恰好写入一份报告。

use std::path::Path;
use std::time::SystemTime;

use crate::error::AppError;
use crate::models::report::AnalysisOutcome;
use crate::models::settings::ProviderConfig;
use crate::services::provider::CompletionProvider;
use crate::services::report_store::ReportStore;
use crate::services::scanner::Scanner;
use crate::services::transcript;
use crate::utils::path::sanitize_file_component;
use crate::utils::time::compact_timestamp;

/// 内置提示词模板
pub const DEFAULT_PROMPT_TEMPLATE: &str = include_str!("../prompts/preference_analysis.md");

const TRANSCRIPT_PLACEHOLDER: &str = "{transcript}";
const SCOPE_PLACEHOLDER: &str = "{scope}";

/// 分析所需的依赖，由 HTTP 层按请求组装
pub struct Analyzer<'a> {
    pub scanner: &'a Scanner,
    pub reports: &'a ReportStore,
    pub provider: &'a dyn CompletionProvider,
    pub template_file: &'a Path,
    pub transcript_max_chars: usize,
}

impl Analyzer<'_> {
    /// 分析单个会话（`session_id` 为 `Some`）或整个项目
    ///
    /// # 错误
    /// - `NotFound`：项目或会话不存在
    /// - `Validation`：没有可分析的消息
    /// - `Provider`：AI 服务调用失败
    pub async fn analyze(
        &self,
        config: &ProviderConfig,
        project_id: &str,
        session_id: Option<&str>,
    ) -> Result<AnalysisOutcome, AppError> {
        let transcript = transcript::build(
            self.scanner,
            project_id,
            session_id,
            self.transcript_max_chars,
        )
        .await?;

        if transcript.included_messages == 0 {
            if transcript.omitted_messages > 0 {
                return Err(AppError::Validation(format!(
                    "转录预算 {} 字符放不下任何消息",
                    self.transcript_max_chars
                )));
            }
            return Err(AppError::Validation("没有可分析的消息".into()));
        }
        if transcript.truncated {
            log::info!(
                "转录文本超出 {} 字符，已省略较早的 {} 条消息",
                self.transcript_max_chars,
                transcript.omitted_messages
            );
        }

        let scope = match session_id {
            Some(session_id) => format!("项目 {project_id} 的会话 {session_id}"),
            None => format!("项目 {project_id} 的全部会话"),
        };
        let template = self.load_template().await?;
        let prompt = render_prompt(&template, &scope, &transcript.text);

        let reply = self.provider.complete(config, &prompt).await.map_err(|e| {
            log::error!("分析 {} 失败: {}", scope, e);
            e
        })?;

        let stem = report_stem(project_id, session_id, SystemTime::now());
        let report = self.reports.create(&stem, &reply).await?;

        Ok(AnalysisOutcome {
            report,
            included_messages: transcript.included_messages,
            omitted_messages: transcript.omitted_messages,
            truncated: transcript.truncated,
        })
    }

    async fn load_template(&self) -> Result<String, AppError> {
        match tokio::fs::read_to_string(self.template_file).await {
            Ok(template) => Ok(template),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(DEFAULT_PROMPT_TEMPLATE.to_string())
            }
            Err(e) => Err(AppError::Io(e)),
        }
    }
}

/// 替换模板占位符；模板中没有 `{transcript}` 时把转录追加到末尾
pub fn render_prompt(template: &str, scope: &str, transcript: &str) -> String {
    let with_scope = template.replace(SCOPE_PLACEHOLDER, scope);
    if with_scope.contains(TRANSCRIPT_PLACEHOLDER) {
        with_scope.replace(TRANSCRIPT_PLACEHOLDER, transcript)
    } else {
        format!("{with_scope}\n\n{transcript}")
    }
}

/// 报告文件名主干：`<项目>__<会话|project>__<YYYYMMDD-HHMMSS>`
pub fn report_stem(project_id: &str, session_id: Option<&str>, now: SystemTime) -> String {
    format!(
        "{}__{}__{}",
        sanitize_file_component(project_id),
        session_id
            .map(sanitize_file_component)
            .unwrap_or_else(|| "project".to_string()),
        compact_timestamp(now)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ClaudeFixture, RecordingProvider, assistant_tool, user_text};
    use std::time::{Duration, UNIX_EPOCH};

    fn config() -> ProviderConfig {
        ProviderConfig {
            api_key: "sk-test".into(),
            base_url: "http://localhost/v1".into(),
            model: "m".into(),
        }
    }

    struct Env {
        fixture: ClaudeFixture,
        scanner: Scanner,
        reports: ReportStore,
    }

    fn env() -> Env {
        let fixture = ClaudeFixture::new();
        let scanner = Scanner::new(&fixture.claude_dir());
        let reports = ReportStore::new(fixture.data_dir().join("reports"));
        Env {
            fixture,
            scanner,
            reports,
        }
    }

    fn analyzer<'a>(
        env: &'a Env,
        provider: &'a dyn CompletionProvider,
        template: &'a Path,
        max: usize,
    ) -> Analyzer<'a> {
        Analyzer {
            scanner: &env.scanner,
            reports: &env.reports,
            provider,
            template_file: template,
            transcript_max_chars: max,
        }
    }

    #[test]
    fn test_report_stem() {
        let now = UNIX_EPOCH + Duration::from_secs(1_709_214_307);
        assert_eq!(
            report_stem("-home-me-app", Some("abc"), now),
            "-home-me-app__abc__20240229-134507"
        );
        assert_eq!(report_stem("p1", None, now), "p1__project__20240229-134507");
    }

    #[test]
    fn test_render_prompt() {
        assert_eq!(render_prompt("A {scope} B {transcript}", "s", "t"), "A s B t");
        assert_eq!(render_prompt("only scope {scope}", "s", "t"), "only scope s\n\nt");
        assert!(DEFAULT_PROMPT_TEMPLATE.contains(TRANSCRIPT_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_session_analysis_writes_one_report() {
        let env = env();
        env.fixture.session(
            "p1",
            "s1",
            &[
                user_text("please use pnpm", "2025-01-01T00:00:00Z"),
                assistant_tool("Bash", "2025-01-01T00:00:05Z"),
            ],
        );
        let provider = RecordingProvider::ok("# 偏好\n- 使用 pnpm");
        let template = env.fixture.data_dir().join("prompt_template.md");

        let outcome = analyzer(&env, &provider, &template, 10_000)
            .analyze(&config(), "p1", Some("s1"))
            .await
            .unwrap();

        assert_eq!(outcome.included_messages, 2);
        assert!(!outcome.truncated);
        assert!(outcome.report.filename.starts_with("p1__s1__"));

        let reports = env.reports.list().await.unwrap();
        assert_eq!(reports.len(), 1);
        let content = env.reports.read(&reports[0].filename).await.unwrap();
        assert_eq!(content.content, "# 偏好\n- 使用 pnpm");

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("please use pnpm"));
        assert!(prompts[0].contains("项目 p1 的会话 s1"));
    }

    #[tokio::test]
    async fn test_custom_template_is_used() {
        let env = env();
        env.fixture.session("p1", "s1", &[user_text("hi", "2025-01-01T00:00:00Z")]);
        let template = env.fixture.data_dir().join("prompt_template.md");
        std::fs::write(&template, "CUSTOM {transcript}").unwrap();
        let provider = RecordingProvider::ok("ok");

        analyzer(&env, &provider, &template, 10_000)
            .analyze(&config(), "p1", None)
            .await
            .unwrap();
        assert!(provider.prompts.lock().unwrap()[0].starts_with("CUSTOM [会话 s1] [user]"));
    }

    #[tokio::test]
    async fn test_oversized_transcript_is_truncated_and_succeeds() {
        let env = env();
        let records: Vec<_> = (0..50)
            .map(|i| user_text(&format!("message {i} {}", "z".repeat(200)), "2025-01-01T00:00:00Z"))
            .collect();
        env.fixture.session("p1", "big", &records);
        let provider = RecordingProvider::ok("report");
        let template = env.fixture.data_dir().join("prompt_template.md");

        let outcome = analyzer(&env, &provider, &template, 2_000)
            .analyze(&config(), "p1", Some("big"))
            .await
            .unwrap();

        assert!(outcome.truncated);
        assert!(outcome.omitted_messages > 0);
        assert_eq!(outcome.included_messages + outcome.omitted_messages, 50);
        let prompt = &provider.prompts.lock().unwrap()[0];
        assert!(prompt.contains("message 49"));
        assert!(!prompt.contains("message 0 "));
        assert_eq!(env.reports.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failures_write_no_report() {
        let env = env();
        env.fixture.session("p1", "s1", &[user_text("hi", "2025-01-01T00:00:00Z")]);
        env.fixture.session("p1", "empty", &[]);
        let template = env.fixture.data_dir().join("prompt_template.md");

        let failing = RecordingProvider::failing("HTTP 503");
        let result = analyzer(&env, &failing, &template, 10_000)
            .analyze(&config(), "p1", Some("s1"))
            .await;
        assert!(matches!(result, Err(AppError::Provider(_))));

        let ok = RecordingProvider::ok("x");
        let a = analyzer(&env, &ok, &template, 10_000);
        assert!(matches!(
            a.analyze(&config(), "p1", Some("missing")).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            a.analyze(&config(), "nope", None).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            a.analyze(&config(), "p1", Some("empty")).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(ok.calls(), 0);
        assert!(env.reports.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_budget_too_small_for_any_message() {
        let env = env();
        env.fixture.session(
            "p1",
            "s1",
            &[user_text("a message that cannot fit", "2025-01-01T00:00:00Z")],
        );
        let template = env.fixture.data_dir().join("prompt_template.md");
        let provider = RecordingProvider::ok("x");

        let result = analyzer(&env, &provider, &template, 10)
            .analyze(&config(), "p1", Some("s1"))
            .await;
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("10")));
        assert_eq!(provider.calls(), 0);
        assert!(env.reports.list().await.unwrap().is_empty());
    }
}
