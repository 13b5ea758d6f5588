//! 二维角度坐标

use crate::{SERVO_MAX_ANGLE, SERVO_MIN_ANGLE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 云台位置（X/Y 两轴角度，单位：度）
///
/// 使用有符号整数：插值中间结果可能越界，下发前由 [`Point::clamped`] 截断到 `[0, 180]`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// 中位点 (90, 90)
    pub const fn neutral() -> Self {
        Self::new(crate::NEUTRAL_ANGLE, crate::NEUTRAL_ANGLE)
    }

    /// 欧氏距离
    pub fn distance(self, other: Point) -> f64 {
        let dx = f64::from(other.x - self.x);
        let dy = f64::from(other.y - self.y);
        dx.hypot(dy)
    }

    /// 两轴均截断到舵机范围 `[0, 180]`
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(SERVO_MIN_ANGLE, SERVO_MAX_ANGLE),
            y: self.y.clamp(SERVO_MIN_ANGLE, SERVO_MAX_ANGLE),
        }
    }

    pub fn is_within_servo_range(self) -> bool {
        (SERVO_MIN_ANGLE..=SERVO_MAX_ANGLE).contains(&self.x)
            && (SERVO_MIN_ANGLE..=SERVO_MAX_ANGLE).contains(&self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
