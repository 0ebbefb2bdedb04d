//! # 转录文本构建
//!
//! 将会话消息拼接为发送给 AI 服务的纯文本，并限制总字符数。
//!
//! ## 截断策略
//! 超出预算时从最旧的消息开始整条丢弃，保留最新的消息；
//! 如果最新的一条消息本身就超出预算，只保留其末尾能放下的部分。
//! 被丢弃的消息数写在转录开头的省略标记中。

use crate::error::AppError;
use crate::models::message::Message;
use crate::services::scanner::Scanner;

const SEPARATOR: &str = "\n";

/// 构建完成的转录文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    pub included_messages: usize,
    pub omitted_messages: usize,
    pub truncated: bool,
}

/// 构建单个会话或整个项目的转录文本
///
/// 整个项目时会话按首条消息时间升序排列，每条消息标注所属会话。
///
/// # 错误
/// 项目或会话不存在时返回 `NotFound`
pub async fn build(
    scanner: &Scanner,
    project_id: &str,
    session_id: Option<&str>,
    max_chars: usize,
) -> Result<Transcript, AppError> {
    let blocks = match session_id {
        Some(session_id) => scanner
            .read_session(project_id, session_id)
            .await?
            .iter()
            .filter_map(|m| render_message(m, None))
            .collect(),
        None => project_blocks(scanner, project_id).await?,
    };

    Ok(bound(blocks, max_chars))
}

async fn project_blocks(scanner: &Scanner, project_id: &str) -> Result<Vec<String>, AppError> {
    let mut sessions = Vec::new();
    for session in scanner.session_refs(Some(project_id)).await? {
        let what = format!("会话 {}/{}", session.project_id, session.session_id);
        match scanner.read_session_file(&session.path, &what).await {
            Ok(messages) => sessions.push((session.session_id, messages)),
            Err(AppError::NotFound(_)) => continue,
            Err(e) => return Err(e),
        }
    }

    sessions.sort_by_cached_key(|(id, messages)| {
        let first = messages.iter().find_map(|m| m.timestamp_text());
        (first.unwrap_or_default(), id.clone())
    });

    Ok(sessions
        .iter()
        .flat_map(|(id, messages)| {
            messages
                .iter()
                .filter_map(move |m| render_message(m, Some(id.as_str())))
        })
        .collect())
}

/// 渲染单条消息；内容为空的消息不进入转录
fn render_message(message: &Message, session_id: Option<&str>) -> Option<String> {
    let content = message.content.trim();
    if content.is_empty() {
        return None;
    }

    let mut header = String::new();
    if let Some(id) = session_id {
        header.push_str(&format!("[会话 {id}] "));
    }
    header.push_str(&format!("[{}]", message.kind.as_str()));
    if let Some(ts) = message.timestamp_text() {
        header.push_str(&format!(" {ts}"));
    }

    Some(format!("{header}\n{content}\n"))
}

/// 将消息块拼接为不超过 `max_chars` 个字符的转录文本
///
/// 截断时省略标记行也计入预算。预算连省略标记都放不下时，
/// 返回空文本且 `included_messages` 为 0。
pub fn bound(blocks: Vec<String>, max_chars: usize) -> Transcript {
    let lengths: Vec<usize> = blocks.iter().map(|b| b.chars().count()).collect();
    let total: usize =
        lengths.iter().sum::<usize>() + SEPARATOR.len() * blocks.len().saturating_sub(1);

    if total <= max_chars {
        return Transcript {
            included_messages: blocks.len(),
            omitted_messages: 0,
            truncated: false,
            text: blocks.join(SEPARATOR),
        };
    }

    // 按省略全部消息时的标记长度预留，实际标记不会更长
    let available = match max_chars.checked_sub(marker_cost(blocks.len())) {
        Some(available) if available > 0 => available,
        _ => {
            return Transcript {
                included_messages: 0,
                omitted_messages: blocks.len(),
                truncated: true,
                text: String::new(),
            };
        }
    };

    // 从最新的消息往前累加，直到放不下为止
    let mut kept = 0;
    let mut used = 0;
    for len in lengths.iter().rev() {
        let cost = len + if kept == 0 { 0 } else { SEPARATOR.len() };
        if used + cost > available {
            break;
        }
        used += cost;
        kept += 1;
    }

    let start = blocks.len() - kept;
    let mut kept_blocks: Vec<String> = blocks[start..].to_vec();
    if kept_blocks.is_empty() {
        if let Some(newest) = blocks.last() {
            let tail = tail_chars(newest, available);
            if !tail.trim().is_empty() {
                kept_blocks.push(tail);
            }
        }
    }

    let omitted = blocks.len() - kept_blocks.len();
    let mut text = omission_marker(omitted);
    for block in &kept_blocks {
        text.push_str(SEPARATOR);
        text.push_str(block);
    }

    Transcript {
        included_messages: kept_blocks.len(),
        omitted_messages: omitted,
        truncated: true,
        text,
    }
}

fn omission_marker(omitted: usize) -> String {
    format!("[... 已省略较早的 {omitted} 条消息，转录文本已截断 ...]")
}

/// 省略标记及其后分隔符占用的字符数上限
fn marker_cost(total_blocks: usize) -> usize {
    omission_marker(total_blocks).chars().count() + SEPARATOR.len()
}

/// 保留字符串末尾的 `max` 个字符
fn tail_chars(text: &str, max: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(max)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ClaudeFixture, user_text};

    fn blocks(sizes: &[usize]) -> Vec<String> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, n)| format!("{i}{}", "x".repeat(n - 1)))
            .collect()
    }

    #[test]
    fn test_within_budget_is_untouched() {
        let t = bound(blocks(&[10, 10]), 100);
        assert!(!t.truncated);
        assert_eq!(t.included_messages, 2);
        assert_eq!(t.text.chars().count(), 21);
    }

    #[test]
    fn test_oldest_messages_dropped_first() {
        // 标记之外还剩 81 个字符：只能放下最后两条（40 + 1 + 40）
        let max = marker_cost(4) + 81;
        let t = bound(blocks(&[40, 40, 40, 40]), max);
        assert!(t.truncated);
        assert_eq!(t.omitted_messages, 2);
        assert_eq!(t.included_messages, 2);
        assert!(t.text.starts_with("[... 已省略较早的 2 条消息"));
        let expected = format!("\n2{}\n3{}", "x".repeat(39), "x".repeat(39));
        assert!(t.text.ends_with(&expected));
        assert!(!t.text.contains('1'));
        assert!(t.text.chars().count() <= max);
    }

    #[test]
    fn test_oversized_newest_message_keeps_tail() {
        let mut input = blocks(&[5]);
        input.push(format!("{}END", "y".repeat(1000)));
        let max = marker_cost(2) + 50;
        let t = bound(input, max);
        assert!(t.truncated);
        assert_eq!(t.included_messages, 1);
        assert_eq!(t.omitted_messages, 1);
        assert!(t.text.ends_with("END"));
        assert!(t.text.chars().count() <= max);
    }

    #[test]
    fn test_tiny_budget_never_exceeds_limit() {
        let input = vec![
            "hello world, this is older".to_string(),
            "newest message here".to_string(),
        ];
        for max in [0, 10, marker_cost(2)] {
            let t = bound(input.clone(), max);
            assert!(t.truncated);
            assert_eq!(t.included_messages, 0, "max = {max}");
            assert_eq!(t.omitted_messages, 2);
            assert!(t.text.chars().count() <= max, "max = {max}");
        }

        let max = marker_cost(2) + 4;
        let t = bound(input, max);
        assert_eq!(t.included_messages, 1);
        assert!(t.text.ends_with("\nhere"));
        assert!(t.text.chars().count() <= max);
    }

    #[test]
    fn test_truncation_is_deterministic() {
        let a = bound(blocks(&[30, 40, 50, 60]), 150);
        let b = bound(blocks(&[30, 40, 50, 60]), 150);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_project_transcript_orders_sessions_oldest_first() {
        let fixture = ClaudeFixture::new();
        fixture.session("p1", "a-later", &[user_text("second", "2025-02-01T00:00:00Z")]);
        fixture.session("p1", "z-earlier", &[user_text("first", "2025-01-01T00:00:00Z")]);

        let scanner = Scanner::new(&fixture.claude_dir());
        let t = build(&scanner, "p1", None, 10_000).await.unwrap();
        assert_eq!(t.included_messages, 2);
        let first = t.text.find("first").unwrap();
        let second = t.text.find("second").unwrap();
        assert!(first < second);
        assert!(t.text.starts_with("[会话 z-earlier] [user] 2025-01-01T00:00:00Z\nfirst\n"));
    }

    #[tokio::test]
    async fn test_missing_session_is_not_found() {
        let fixture = ClaudeFixture::new();
        fixture.session("p1", "s1", &[]);
        let scanner = Scanner::new(&fixture.claude_dir());
        assert!(matches!(
            build(&scanner, "p1", Some("nope"), 100).await,
            Err(AppError::NotFound(_))
        ));
    }
}
