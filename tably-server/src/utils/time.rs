//! 时间工具函数 — 业务时区转换
//!
//! 所有日期→时间戳转换统一在 handler / service 层完成，
//! repository 层只接收 `i64` Unix millis。排班窗口使用
//! "HH:MM" 字符串 + 星期索引 (0 = Sunday)。

use chrono::{DateTime, Datelike, NaiveTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 当前 Unix 毫秒时间戳
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// 解析时间字符串 (HH:MM)
pub fn parse_hhmm(value: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| AppError::validation(format!("Invalid time format: {} (expected HH:MM)", value)))
}

/// 解析 IANA 时区名，失败 fallback 到 UTC
pub fn parse_tz(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or_else(|_| {
        tracing::warn!("Unknown timezone '{}', falling back to UTC", name);
        Tz::UTC
    })
}

/// 星期索引: 0=Sunday ... 6=Saturday
pub fn weekday_index(weekday: Weekday) -> u8 {
    match weekday {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

/// Unix millis → 业务时区的 (星期索引, 当地时间)
pub fn local_parts(at_millis: i64, tz: Tz) -> (u8, NaiveTime) {
    let dt: DateTime<Tz> = DateTime::from_timestamp_millis(at_millis)
        .unwrap_or_else(Utc::now)
        .with_timezone(&tz);
    let time = NaiveTime::from_hms_opt(dt.hour(), dt.minute(), dt.second())
        .unwrap_or_else(|| NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    (weekday_index(dt.weekday()), time)
}

/// 时间窗口包含判断，支持跨夜 (close <= open 表示跨过午夜)
///
/// 22:00–02:00 在 23:30 和 01:00 都为 true。
pub fn window_contains(open: NaiveTime, close: NaiveTime, at: NaiveTime) -> bool {
    if open < close {
        at >= open && at < close
    } else {
        // Overnight
        at >= open || at < close
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_window_contains_same_day() {
        assert!(window_contains(t(11, 0), t(15, 0), t(12, 30)));
        assert!(!window_contains(t(11, 0), t(15, 0), t(15, 0)));
        assert!(!window_contains(t(11, 0), t(15, 0), t(10, 59)));
    }

    #[test]
    fn test_window_contains_overnight() {
        assert!(window_contains(t(22, 0), t(2, 0), t(23, 30)));
        assert!(window_contains(t(22, 0), t(2, 0), t(1, 0)));
        assert!(!window_contains(t(22, 0), t(2, 0), t(12, 0)));
    }

    #[test]
    fn test_parse_hhmm() {
        assert!(parse_hhmm("09:30").is_ok());
        assert!(parse_hhmm("9:30").is_ok());
        assert!(parse_hhmm("25:00").is_err());
        assert!(parse_hhmm("lunch").is_err());
    }
}
