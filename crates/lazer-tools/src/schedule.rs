//! # 周计划求值
//!
//! 取 `now` 所在星期的记录列表，按顺序检查窗口 `[start, start + onDuration)`，
//! 返回第一个包含 `now` 的记录。`start` 为当天日期加记录的 `HH:MM`。
//! 开始时刻无法解析的记录被跳过（记录警告），不影响其余记录。

use chrono::{Datelike, NaiveDateTime, NaiveTime, TimeDelta};
use lazer_protocol::{ProtocolError, ScheduleEntry, Weekday, WeeklySchedule};
use tracing::warn;

/// 记录在 `now` 当天的时间窗口 `(start, end)`
///
/// 时长超出可表示范围时 `end` 为 `None`（窗口无上界）。
pub fn entry_window(
    entry: &ScheduleEntry,
    now: NaiveDateTime,
) -> Result<(NaiveDateTime, Option<NaiveDateTime>), ProtocolError> {
    let clock = entry.parse_start()?;
    let time = NaiveTime::from_hms_opt(u32::from(clock.hour), u32::from(clock.minute), 0)
        .ok_or_else(|| ProtocolError::InvalidTimeFormat(entry.start_time.clone()))?;
    let start = now.date().and_time(time);
    let end = TimeDelta::from_std(entry.on_duration)
        .ok()
        .and_then(|d| start.checked_add_signed(d));
    Ok((start, end))
}

/// 当前生效的计划记录（首个匹配）
pub fn find_active_entry(schedule: &WeeklySchedule, now: NaiveDateTime) -> Option<&ScheduleEntry> {
    let day = match Weekday::from_monday_index(now.weekday().num_days_from_monday()) {
        Ok(day) => day,
        Err(e) => {
            warn!("Cannot map weekday for {}: {}", now, e);
            return None;
        },
    };

    schedule.entries(day).iter().find(|entry| match entry_window(entry, now) {
        Ok((start, end)) => start <= now && end.is_none_or(|end| now < end),
        Err(e) => {
            warn!("Skipping schedule entry on {:?}: {}", day, e);
            false
        },
    })
}
