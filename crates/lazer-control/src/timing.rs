//! 速度缩放

use std::time::Duration;

/// 把舵机时间提示按速度缩放为步间等待
///
/// `delay = hint · 100 / clamp(speed · 100, 1, 100)`：速度越低等待越长，
/// Slow/Medium/Fast 由同一机制实现。
pub fn scale_delay(hint: Duration, speed: f64) -> Duration {
    let percent = (speed * 100.0).clamp(1.0, 100.0);
    let millis = hint.as_millis() as f64 * (100.0 / percent);
    Duration::from_millis(millis as u64)
}
