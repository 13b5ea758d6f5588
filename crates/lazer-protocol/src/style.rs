//! 运动样式

use serde::{Deserialize, Serialize};
use std::fmt;

/// 一段运动的插值样式
///
/// 前 11 种样式产生实际位移；`ShortPause`/`LongPause` 不移动，只产生一次停顿。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    num_enum::TryFromPrimitive,
    num_enum::IntoPrimitive,
)]
#[repr(u8)]
pub enum MovementStyle {
    #[default]
    Straight = 0,
    Curve = 1,
    Bounce = 2,
    BackAndForth = 3,
    Jagged = 4,
    Ease = 5,
    ZigZag = 6,
    Spiral = 7,
    Random = 8,
    SmoothStep = 9,
    Wave = 10,
    ShortPause = 11,
    LongPause = 12,
}

impl MovementStyle {
    /// 产生位移的样式（`Straight` ..= `Wave`）
    pub const MOTION: [MovementStyle; 11] = [
        MovementStyle::Straight,
        MovementStyle::Curve,
        MovementStyle::Bounce,
        MovementStyle::BackAndForth,
        MovementStyle::Jagged,
        MovementStyle::Ease,
        MovementStyle::ZigZag,
        MovementStyle::Spiral,
        MovementStyle::Random,
        MovementStyle::SmoothStep,
        MovementStyle::Wave,
    ];

    /// 全部 13 种样式
    pub const ALL: [MovementStyle; 13] = [
        MovementStyle::Straight,
        MovementStyle::Curve,
        MovementStyle::Bounce,
        MovementStyle::BackAndForth,
        MovementStyle::Jagged,
        MovementStyle::Ease,
        MovementStyle::ZigZag,
        MovementStyle::Spiral,
        MovementStyle::Random,
        MovementStyle::SmoothStep,
        MovementStyle::Wave,
        MovementStyle::ShortPause,
        MovementStyle::LongPause,
    ];

    pub fn is_pause(self) -> bool {
        matches!(self, MovementStyle::ShortPause | MovementStyle::LongPause)
    }
}

impl fmt::Display for MovementStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
