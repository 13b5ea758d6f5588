//! 运行状态
//!
//! `OperatingState` 是有序的：`Off < Configuring < Slow < Medium < Fast`，
//! 控制器用 "不高于 Configuring" 判断是否应当停止运动。

use crate::ProtocolError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 控制器运行状态
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    num_enum::TryFromPrimitive,
    num_enum::IntoPrimitive,
)]
#[repr(u8)]
pub enum OperatingState {
    /// 关闭（初始状态）
    #[default]
    Off = 0,
    /// 校准中
    Configuring = 1,
    Slow = 2,
    Medium = 3,
    Fast = 4,
}

impl OperatingState {
    pub const ALL: [OperatingState; 5] = [
        OperatingState::Off,
        OperatingState::Configuring,
        OperatingState::Slow,
        OperatingState::Medium,
        OperatingState::Fast,
    ];

    /// 状态名称（也是 JSON 中的写法）
    pub fn name(self) -> &'static str {
        match self {
            OperatingState::Off => "Off",
            OperatingState::Configuring => "Configuring",
            OperatingState::Slow => "Slow",
            OperatingState::Medium => "Medium",
            OperatingState::Fast => "Fast",
        }
    }

    /// 是否处于运动状态（高于 `Configuring`）
    pub fn is_moving(self) -> bool {
        self > OperatingState::Configuring
    }

    /// 运动状态对应的速度系数
    ///
    /// `Slow`/`Medium`/`Fast` 分别为 0.25/0.5/1.0，其他状态返回 `None`。
    pub fn speed(self) -> Option<f64> {
        match self {
            OperatingState::Slow => Some(0.25),
            OperatingState::Medium => Some(0.5),
            OperatingState::Fast => Some(1.0),
            OperatingState::Off | OperatingState::Configuring => None,
        }
    }

    /// 右键短按时的下一个状态
    ///
    /// 不高于 `Configuring` 时进入 `Slow`，之后依次 `Medium`、`Fast`，
    /// `Fast` 回绕到 `Off`。
    pub fn next_speed(self) -> OperatingState {
        match self {
            OperatingState::Off | OperatingState::Configuring => OperatingState::Slow,
            OperatingState::Slow => OperatingState::Medium,
            OperatingState::Medium => OperatingState::Fast,
            OperatingState::Fast => OperatingState::Off,
        }
    }
}

impl fmt::Display for OperatingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OperatingState {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        OperatingState::ALL
            .into_iter()
            .find(|state| state.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ProtocolError::UnknownState(s.to_string()))
    }
}

impl Serialize for OperatingState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for OperatingState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StateVisitor;

        impl Visitor<'_> for StateVisitor {
            type Value = OperatingState;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a state name (Off, Configuring, Slow, Medium, Fast) or its ordinal")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                u8::try_from(v)
                    .ok()
                    .and_then(|raw| OperatingState::try_from(raw).ok())
                    .ok_or_else(|| {
                        E::custom(ProtocolError::InvalidValue {
                            field: "state",
                            value: v,
                        })
                    })
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                let v = u64::try_from(v)
                    .map_err(|_| E::custom(format!("negative state value: {v}")))?;
                self.visit_u64(v)
            }
        }

        deserializer.deserialize_any(StateVisitor)
    }
}
