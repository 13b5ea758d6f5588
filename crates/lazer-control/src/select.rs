//! 随机目标点与样式

use lazer_protocol::{AxisRange, MovementStyle, Point};
use rand::Rng;
use rand::seq::SliceRandom;

/// 在两轴配置范围内均匀取一个目标点（截断到 `[0, 180]`）
pub fn random_target<R: Rng + ?Sized>(x_range: AxisRange, y_range: AxisRange, rng: &mut R) -> Point {
    let mut pick = |range: AxisRange| {
        let min = f64::from(range.min_angle);
        let span = f64::from(range.max_angle - range.min_angle);
        (min + rng.r#gen::<f64>() * span).clamp(0.0, 180.0) as i32
    };
    let x = pick(x_range);
    let y = pick(y_range);
    Point::new(x, y)
}

/// 均匀随机样式
///
/// `include_pauses = false` 时只在 11 种运动样式中选择。
pub fn random_style<R: Rng + ?Sized>(include_pauses: bool, rng: &mut R) -> MovementStyle {
    let table: &[MovementStyle] = if include_pauses {
        &MovementStyle::ALL
    } else {
        &MovementStyle::MOTION
    };
    table.choose(rng).copied().unwrap_or_default()
}
