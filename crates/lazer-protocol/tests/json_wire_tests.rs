//! 配置 JSON 格式测试
//!
//! 覆盖配置文件与 HTTP 接口共用的字段名、纳秒时长与状态写法。

use lazer_protocol::*;
use serde_json::json;
use std::time::Duration;

#[test]
fn test_configuration_wire_shape() {
    let mut config = Configuration {
        x_range: AxisRange::new(20, 160),
        y_range: AxisRange::new(10, 90),
        ..Default::default()
    };
    config.schedule.push(
        Weekday::Monday,
        ScheduleEntry::new("08:00", Duration::from_secs(3600), OperatingState::Slow),
    );

    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(
        value,
        json!({
            "xRange": {"minAngle": 20, "maxAngle": 160},
            "yRange": {"minAngle": 10, "maxAngle": 90},
            "schedule": {
                "0": [{"startTime": "08:00", "onDuration": 3_600_000_000_000u64, "state": "Slow"}]
            }
        })
    );

    let back: Configuration = serde_json::from_value(value).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_state_accepts_name_or_ordinal() {
    let entries: Vec<ScheduleEntry> = serde_json::from_value(json!([
        {"startTime": "09:00", "onDuration": 60_000_000_000u64, "state": "Fast"},
        {"startTime": "10:00", "onDuration": 60_000_000_000u64, "state": 3},
        {"startTime": "11:00", "onDuration": 60_000_000_000u64, "state": "medium"}
    ]))
    .unwrap();

    assert_eq!(entries[0].state, OperatingState::Fast);
    assert_eq!(entries[1].state, OperatingState::Medium);
    assert_eq!(entries[2].state, OperatingState::Medium);
    assert_eq!(entries[0].on_duration, Duration::from_secs(60));
}

#[test]
fn test_invalid_state_rejected() {
    let bad_name = serde_json::from_value::<ScheduleEntry>(
        json!({"startTime": "09:00", "onDuration": 0, "state": "Turbo"}),
    );
    assert!(bad_name.is_err());

    let bad_number = serde_json::from_value::<ScheduleEntry>(
        json!({"startTime": "09:00", "onDuration": 0, "state": 42}),
    );
    assert!(bad_number.is_err());
}

#[test]
fn test_invalid_weekday_key_rejected() {
    let result = serde_json::from_value::<WeeklySchedule>(json!({
        "7": [{"startTime": "09:00", "onDuration": 0, "state": "Slow"}]
    }));
    assert!(result.is_err());
}

#[test]
fn test_missing_fields_fall_back_to_defaults() {
    let config: Configuration = serde_json::from_value(json!({})).unwrap();
    assert_eq!(config, Configuration::default());
    assert_eq!(config.x_range, AxisRange::full());
    assert!(config.schedule.is_empty());
}

#[test]
fn test_bad_start_time_survives_parsing() {
    // 格式错误的时间在加载时保留，求值时才跳过
    let entry: ScheduleEntry = serde_json::from_value(
        json!({"startTime": "nine", "onDuration": 0, "state": "Slow"}),
    )
    .unwrap();
    assert!(entry.parse_start().is_err());
}

#[test]
fn test_omitted_entry_fields_take_zero_values() {
    let config: Configuration = serde_json::from_value(json!({
        "xRange": {"minAngle": 30, "maxAngle": 150},
        "schedule": {
            "2": [
                {"startTime": "22:00", "onDuration": 60_000_000_000u64},
                {"startTime": "07:00", "state": "Fast"}
            ]
        }
    }))
    .unwrap();

    assert_eq!(config.x_range, AxisRange::new(30, 150));
    let entries = config.schedule.entries(Weekday::Wednesday);
    assert_eq!(entries[0].state, OperatingState::Off);
    assert_eq!(entries[0].on_duration, Duration::from_secs(60));
    assert_eq!(entries[1].state, OperatingState::Fast);
    assert_eq!(entries[1].on_duration, Duration::ZERO);
}
