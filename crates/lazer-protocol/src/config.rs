//! 持久化配置
//!
//! 包括每个轴的可用角度范围 [`AxisRange`] 与周计划 [`WeeklySchedule`]。
//! JSON 格式：
//!
//! ```text
//! { "xRange": {"minAngle":0,"maxAngle":180},
//!   "yRange": {"minAngle":0,"maxAngle":180},
//!   "schedule": { "0": [ {"startTime":"08:00","onDuration":3600000000000,"state":"Slow"} ] } }
//! ```

use crate::{OperatingState, ProtocolError, SERVO_MAX_ANGLE, SERVO_MIN_ANGLE};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// 单轴可用角度范围（度）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisRange {
    pub min_angle: i32,
    pub max_angle: i32,
}

impl Default for AxisRange {
    fn default() -> Self {
        Self::full()
    }
}

impl AxisRange {
    pub const fn new(min_angle: i32, max_angle: i32) -> Self {
        Self {
            min_angle,
            max_angle,
        }
    }

    /// 完整范围 0..=180
    pub const fn full() -> Self {
        Self::new(SERVO_MIN_ANGLE, SERVO_MAX_ANGLE)
    }

    /// 截断到 `[0, 180]`，并保证 `min <= max`
    pub fn normalized(self) -> Self {
        let a = self.min_angle.clamp(SERVO_MIN_ANGLE, SERVO_MAX_ANGLE);
        let b = self.max_angle.clamp(SERVO_MIN_ANGLE, SERVO_MAX_ANGLE);
        Self::new(a.min(b), a.max(b))
    }

    pub fn contains(&self, angle: i32) -> bool {
        (self.min_angle..=self.max_angle).contains(&angle)
    }
}

/// 星期（Monday=0 … Sunday=6）
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    num_enum::TryFromPrimitive,
    num_enum::IntoPrimitive,
)]
#[repr(u8)]
pub enum Weekday {
    Monday = 0,
    Tuesday = 1,
    Wednesday = 2,
    Thursday = 3,
    Friday = 4,
    Saturday = 5,
    Sunday = 6,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// 从 "距周一的天数" 构造
    pub fn from_monday_index(index: u32) -> Result<Self, ProtocolError> {
        u8::try_from(index)
            .ok()
            .and_then(|raw| Weekday::try_from(raw).ok())
            .ok_or(ProtocolError::InvalidValue {
                field: "weekday",
                value: u64::from(index),
            })
    }
}

// JSON 对象的键只能是字符串，serde_json 会把 u8 键写成 "0".."6" 并在读取时解析回来
impl Serialize for Weekday {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*self))
    }
}

impl<'de> Deserialize<'de> for Weekday {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        Weekday::try_from(raw).map_err(|_| {
            serde::de::Error::custom(ProtocolError::InvalidValue {
                field: "weekday",
                value: u64::from(raw),
            })
        })
    }
}

/// 一天中的时刻（时:分）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl ClockTime {
    /// 解析 `HH:MM`（24 小时制）
    pub fn parse(s: &str) -> Result<Self, ProtocolError> {
        let err = || ProtocolError::InvalidTimeFormat(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(err)?;
        if h.is_empty() || m.len() != 2 || h.len() > 2 {
            return Err(err());
        }
        let hour: u8 = h.parse().map_err(|_| err())?;
        let minute: u8 = m.parse().map_err(|_| err())?;
        if hour > 23 || minute > 59 {
            return Err(err());
        }
        Ok(Self { hour, minute })
    }

    /// 自零点起的时长
    pub fn since_midnight(&self) -> Duration {
        Duration::from_secs(u64::from(self.hour) * 3600 + u64::from(self.minute) * 60)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// 周计划中的一条记录
///
/// `start_time` 保留原始字符串：格式错误的记录在求值时跳过，而不是让整个配置加载失败。
/// 缺省的字段取零值（空开始时刻、零时长、`Off`）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// 开始时刻 `HH:MM`
    #[serde(default)]
    pub start_time: String,
    /// 持续时长（JSON 中为纳秒整数）
    #[serde(default, with = "duration_nanos")]
    pub on_duration: Duration,
    /// 窗口内强制进入的状态
    #[serde(default)]
    pub state: OperatingState,
}

impl ScheduleEntry {
    pub fn new(start_time: impl Into<String>, on_duration: Duration, state: OperatingState) -> Self {
        Self {
            start_time: start_time.into(),
            on_duration,
            state,
        }
    }

    pub fn parse_start(&self) -> Result<ClockTime, ProtocolError> {
        ClockTime::parse(&self.start_time)
    }
}

/// 周计划：星期 -> 有序记录列表，按顺序求值，首个匹配生效
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklySchedule {
    days: BTreeMap<Weekday, Vec<ScheduleEntry>>,
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// 某天的记录（未配置时为空切片）
    pub fn entries(&self, day: Weekday) -> &[ScheduleEntry] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 追加一条记录到某天末尾
    pub fn push(&mut self, day: Weekday, entry: ScheduleEntry) {
        self.days.entry(day).or_default().push(entry);
    }

    /// 替换某天的全部记录
    pub fn set_day(&mut self, day: Weekday, entries: Vec<ScheduleEntry>) {
        if entries.is_empty() {
            self.days.remove(&day);
        } else {
            self.days.insert(day, entries);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[ScheduleEntry])> {
        self.days.iter().map(|(day, entries)| (*day, entries.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.days.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

/// 完整的持久化配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(default)]
    pub x_range: AxisRange,
    #[serde(default)]
    pub y_range: AxisRange,
    #[serde(default)]
    pub schedule: WeeklySchedule,
}

/// `Duration` <-> 纳秒整数
pub mod duration_nanos {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = u64::try_from(value.as_nanos()).unwrap_or(u64::MAX);
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}
