//! # 时间工具函数
//!
//! 不引入额外的时间库（如 chrono），使用标准库和公历算法完成：
//! - `SystemTime` → ISO 8601 字符串（会话和报告的修改时间）
//! - `SystemTime` → `YYYYMMDD-HHMMSS`（报告文件名后缀）
//! - 消息时间戳 → (日期, 小时) 统计桶

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

/// 将 `SystemTime` 转换为 ISO 8601 格式字符串
///
/// 格式：`YYYY-MM-DDTHH:MM:SS.sssZ`（UTC 时间）。
/// 早于 Unix epoch 的时间返回 epoch。
pub fn system_time_to_iso8601(time: SystemTime) -> String {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => {
            let (date, hours, minutes, seconds) = split_epoch_secs(duration.as_secs());
            format!(
                "{}T{:02}:{:02}:{:02}.{:03}Z",
                date,
                hours,
                minutes,
                seconds,
                duration.subsec_millis()
            )
        }
        Err(_) => "1970-01-01T00:00:00.000Z".to_string(),
    }
}

/// 将 `SystemTime` 转换为紧凑格式 `YYYYMMDD-HHMMSS`（UTC），用于文件名
pub fn compact_timestamp(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let (date, hours, minutes, seconds) = split_epoch_secs(secs);
    format!(
        "{}-{:02}{:02}{:02}",
        date.replace('-', ""),
        hours,
        minutes,
        seconds
    )
}

/// 从消息的 `timestamp` 字段提取统计桶：(`YYYY-MM-DD`, 小时 0–23)
///
/// 支持两种格式：
/// - ISO 8601 字符串（会话文件）：直接取字面上的日期和小时，不做时区换算
/// - Unix 毫秒数字（history.jsonl）：按 UTC 换算
///
/// # 返回值
/// 无法识别的时间戳返回 `None`
pub fn activity_bucket(timestamp: &Value) -> Option<(String, u8)> {
    match timestamp {
        Value::String(s) => parse_iso_bucket(s),
        Value::Number(n) => {
            let millis = n.as_u64()?;
            let (date, hour, _, _) = split_epoch_secs(millis / 1000);
            Some((date, hour as u8))
        }
        _ => None,
    }
}

/// 解析 `YYYY-MM-DDTHH...` 前缀
fn parse_iso_bucket(s: &str) -> Option<(String, u8)> {
    let bytes = s.as_bytes();
    if bytes.len() < 13 {
        return None;
    }
    let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    if !(digits(0..4)
        && bytes[4] == b'-'
        && digits(5..7)
        && bytes[7] == b'-'
        && digits(8..10)
        && matches!(bytes[10], b'T' | b' ')
        && digits(11..13))
    {
        return None;
    }

    let month: u8 = s[5..7].parse().ok()?;
    let day: u8 = s[8..10].parse().ok()?;
    let hour: u8 = s[11..13].parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) || hour > 23 {
        return None;
    }

    Some((s[..10].to_string(), hour))
}

/// 将 epoch 秒数拆分为 (`YYYY-MM-DD`, 时, 分, 秒)
fn split_epoch_secs(total_secs: u64) -> (String, u64, u64, u64) {
    let days = total_secs / 86400;
    let time_of_day = total_secs % 86400;
    let (year, month, day) = days_to_date(days);
    (
        format!("{:04}-{:02}-{:02}", year, month, day),
        time_of_day / 3600,
        (time_of_day % 3600) / 60,
        time_of_day % 60,
    )
}

/// 将自 1970-01-01 以来的天数转换为 (年, 月, 日)
///
/// 使用 Howard Hinnant 的公历算法：http://howardhinnant.github.io/date_algorithms.html
fn days_to_date(days_since_epoch: u64) -> (u64, u64, u64) {
    let z = days_since_epoch + 719468;
    let era = z / 146097;
    let doe = z - era * 146097; // day of era [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365; // year of era [0, 399]
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // day of year [0, 365]
    let mp = (5 * doy + 2) / 153; // month index [0, 11]
    let d = doy - (153 * mp + 2) / 5 + 1; // day [1, 31]
    let m = if mp < 10 { mp + 3 } else { mp - 9 }; // month [1, 12]
    let y = if m <= 2 { y + 1 } else { y };

    (y, m, d)
}
