//! # 消息转换器
//!
//! 将原始 `serde_json::Value` 记录转换为 `Message`。
//!
//! ## 转换规则
//! - `type` 不是 `user` / `assistant` 的记录（file-history-snapshot、summary 等）不是消息
//! - `message.content` 为字符串时原样使用
//! - `message.content` 为数组时逐块渲染并用换行拼接：
//!   - `text` → 文本
//!   - `thinking` → `💭 思考过程:` + 思考内容
//!   - `tool_use` → `🔧 [工具名: 摘要]`，同时收集到 `tool_uses`
//!   - `tool_result` → `📋 工具结果:` + 内容（超过 500 字符截断）
//!   - 字符串元素 → 原样

use serde_json::Value;

use crate::models::message::{Message, MessageKind, RawRecord, ToolUse};

/// 工具结果在渲染文本中保留的最大字符数
const TOOL_RESULT_MAX_CHARS: usize = 500;

/// 工具调用摘要中命令保留的最大字符数
const TOOL_COMMAND_MAX_CHARS: usize = 100;

/// 将一条原始记录转换为消息
///
/// # 返回值
/// 非 user / assistant 记录返回 `None`
pub fn to_message(record: &RawRecord) -> Option<Message> {
    let kind = match record.get("type").and_then(Value::as_str)? {
        "user" => MessageKind::User,
        "assistant" => MessageKind::Assistant,
        _ => return None,
    };

    let message = record.get("message");
    let mut tool_uses = Vec::new();
    let content = match message.and_then(|m| m.get("content")) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(blocks)) => render_blocks(blocks, &mut tool_uses),
        _ => String::new(),
    };

    Some(Message {
        kind,
        content,
        timestamp: record.get("timestamp").filter(|v| !v.is_null()).cloned(),
        uuid: str_field(record, "uuid"),
        cwd: str_field(record, "cwd").unwrap_or_default(),
        model: message
            .and_then(|m| str_field(m, "model"))
            .unwrap_or_default(),
        tool_uses,
    })
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// 渲染数组格式的 content，顺带收集 tool_use 块
fn render_blocks(blocks: &[Value], tool_uses: &mut Vec<ToolUse>) -> String {
    let mut parts: Vec<String> = Vec::new();

    for block in blocks {
        let item = match block {
            Value::String(s) => {
                parts.push(s.clone());
                continue;
            }
            Value::Object(_) => block,
            _ => continue,
        };

        match item.get("type").and_then(Value::as_str).unwrap_or("") {
            "text" => {
                if let Some(text) = item.get("text").and_then(Value::as_str) {
                    parts.push(text.to_string());
                }
            }
            "thinking" => {
                let thinking = item.get("thinking").and_then(Value::as_str).unwrap_or("");
                if !thinking.is_empty() {
                    parts.push(format!("💭 思考过程:\n{thinking}"));
                }
            }
            "tool_use" => {
                let tool = tool_use_of(item);
                let label = tool.name.as_deref().unwrap_or("unknown");
                match &tool.detail {
                    Some(detail) => parts.push(format!("🔧 [{label}: {detail}]")),
                    None => parts.push(format!("🔧 [{label}]")),
                }
                tool_uses.push(tool);
            }
            "tool_result" => {
                let result = tool_result_text(item.get("content"));
                if !result.is_empty() {
                    parts.push(format!("📋 工具结果:\n{}", truncate_chars(&result, TOOL_RESULT_MAX_CHARS)));
                }
            }
            _ => {}
        }
    }

    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// 从 tool_use 块提取工具名和输入摘要（command > file_path > pattern）
fn tool_use_of(item: &Value) -> ToolUse {
    let name = item
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let input = item.get("input");
    let field = |key: &str| input.and_then(|i| i.get(key)).and_then(Value::as_str);
    let detail = if let Some(command) = field("command") {
        Some(command.chars().take(TOOL_COMMAND_MAX_CHARS).collect())
    } else {
        field("file_path").or_else(|| field("pattern")).map(str::to_string)
    };

    ToolUse { name, detail }
}

/// tool_result 的 content 可能是字符串或 `[{type: "text", text}]` 数组
fn tool_result_text(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|i| i.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
