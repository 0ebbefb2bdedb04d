//! # 路径工具函数
//!
//! 提供与文件路径相关的工具函数，包括：
//! - 获取 Claude Code 数据目录路径（`~/.claude/`）
//! - 获取查看器自身数据目录路径（`~/.claude-history-viewer/`）
//! - 解码编码后的项目目录名为原始文件系统路径
//! - 校验来自 URL 的单段名称（项目 ID、会话 ID、报告文件名）

use std::path::PathBuf;

use crate::error::AppError;

/// 获取 Claude Code 数据目录的默认绝对路径
///
/// Claude Code 将所有用户数据存储在用户主目录下的 `.claude` 文件夹中。
/// 使用 `dirs` crate 获取跨平台的主目录路径。
///
/// # 错误
/// 如果无法确定用户主目录（极端情况，如无 HOME 环境变量），返回错误。
///
/// # 示例
/// - Windows: `C:\Users\username\.claude`
/// - Linux/macOS: `/home/username/.claude`
pub fn default_claude_dir() -> Result<PathBuf, AppError> {
    let home = dirs::home_dir().ok_or_else(|| AppError::Internal("无法获取用户主目录".into()))?;
    Ok(home.join(".claude"))
}

/// 获取查看器自身数据目录的默认绝对路径
///
/// AI 服务配置、分析报告和可选的提示词模板独立存储在
/// `~/.claude-history-viewer/` 下，与 Claude Code 原生数据分离，
/// 避免对 Claude Code 的文件造成意外污染。
pub fn default_data_dir() -> Result<PathBuf, AppError> {
    let home = dirs::home_dir().ok_or_else(|| AppError::Internal("无法获取用户主目录".into()))?;
    Ok(home.join(".claude-history-viewer"))
}

/// 将编码的项目目录名解码为原始文件系统路径
///
/// Claude Code 在 `~/.claude/projects/` 目录下使用编码后的路径作为子目录名，
/// 将路径分隔符和驱动器号替换为短横线，以适应文件系统命名限制。
///
/// # 解码规则
///
/// 1. 将 `--` 替换为临时占位符 `\x00`，避免被单短横线替换逻辑误处理
/// 2. 将剩余的单 `-` 替换为路径分隔符
/// 3. 将占位符还原为路径分隔符
/// 4. 以 `X\` 开头（单字母后跟分隔符）时还原 Windows 盘符 `X:\`
///
/// 解码结果使用 `/` 还是 `\` 取决于编码名本身：
/// 以盘符开头的名称视为 Windows 路径，其余视为 Unix 路径（与运行平台无关，
/// 因为数据可能是从另一台机器复制过来的）。
///
/// # 示例
/// ```
/// use app_lib::utils::path::decode_project_path;
/// assert_eq!(decode_project_path("G--ClaudeProjects-Test"), r"G:\ClaudeProjects\Test");
/// assert_eq!(decode_project_path("-home-user-app"), "/home/user/app");
/// ```
pub fn decode_project_path(encoded_name: &str) -> String {
    let is_windows = {
        let mut chars = encoded_name.chars();
        matches!(
            (chars.next(), chars.next(), chars.next()),
            (Some(c), Some('-'), Some('-')) if c.is_ascii_alphabetic()
        )
    };
    let separator = if is_windows { "\\" } else { "/" };

    let result = encoded_name
        .replace("--", "\x00")
        .replace('-', separator)
        .replace('\x00', separator);

    if is_windows {
        // "G\ClaudeProjects" → "G:\ClaudeProjects"
        format!("{}:{}", &result[..1], &result[1..])
    } else {
        result
    }
}

/// 校验来自 URL 的单段名称
///
/// 项目 ID、会话 ID 和报告文件名都直接拼接进磁盘路径，
/// 因此必须是单个路径组件：非空、不含路径分隔符、不是 `.` / `..`。
///
/// # 返回值
/// 合法时返回 `true`
pub fn is_safe_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// 将任意 ID 转换为可安全用作文件名片段的字符串
///
/// 仅保留 ASCII 字母数字和 `-` `_` `.`，其余字符替换为 `_`。
pub fn sanitize_file_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}
