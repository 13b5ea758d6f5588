//! 舵机通道管理
//!
//! 角度 `a ∈ [0, 180]` 映射到 12 位 PWM 计数 `255 + (2048 - 255) · a / 180`
//! （50 Hz，PCA9685 类驱动板）。

use crate::{DigitalOutput, IoError, PwmBackend, ServoSink};
use lazer_protocol::{NEUTRAL_ANGLE, Point, SERVO_MAX_ANGLE, SERVO_MIN_ANGLE};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// PCA9685 通道数
pub const MAX_CHANNELS: u8 = 16;

const MIN_PULSE: f64 = 255.0;
const MAX_PULSE: f64 = 2048.0;

/// 角度对应的脉宽计数（未取整）
pub fn angle_to_pulse(angle: i32) -> f64 {
    let angle = angle.clamp(SERVO_MIN_ANGLE, SERVO_MAX_ANGLE);
    MIN_PULSE + (MAX_PULSE - MIN_PULSE) * f64::from(angle) / f64::from(SERVO_MAX_ANGLE)
}

#[derive(Debug, Clone, Copy)]
struct ChannelState {
    angle: i32,
    last_pulse: f64,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            angle: NEUTRAL_ANGLE,
            last_pulse: angle_to_pulse(NEUTRAL_ANGLE),
        }
    }
}

/// 舵机组 + 数字输出
///
/// 每个通道有独立的锁，X/Y 并发设置时同一通道内的命令不会交错。
/// 通道在第一次被访问时登记，之后 `reset()` 会覆盖所有已登记的通道。
pub struct ServoBank<P: PwmBackend, D: DigitalOutput> {
    pwm: P,
    pins: D,
    channels: RwLock<BTreeMap<u8, Arc<Mutex<ChannelState>>>>,
    driven_pins: Mutex<BTreeSet<u32>>,
    settle: Duration,
}

impl<P: PwmBackend, D: DigitalOutput> ServoBank<P, D> {
    /// 创建舵机组
    ///
    /// # 参数
    ///
    /// - `pwm`: PWM 后端
    /// - `pins`: 数字输出后端
    pub fn new(pwm: P, pins: D) -> Self {
        Self {
            pwm,
            pins,
            channels: RwLock::new(BTreeMap::new()),
            driven_pins: Mutex::new(BTreeSet::new()),
            settle: Duration::from_secs(1),
        }
    }

    /// 设置 `reset()` 之后的等待时间（默认 1 秒）
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    pub fn pins(&self) -> &D {
        &self.pins
    }

    fn channel(&self, channel: u8) -> Arc<Mutex<ChannelState>> {
        if let Some(state) = self.channels.read().get(&channel) {
            return Arc::clone(state);
        }
        Arc::clone(self.channels.write().entry(channel).or_default())
    }

    fn known_channels(&self) -> Vec<u8> {
        self.channels.read().keys().copied().collect()
    }

    fn check_channel(channel: i32) -> Result<Option<u8>, IoError> {
        if channel < 0 {
            return Ok(None);
        }
        match u8::try_from(channel) {
            Ok(ch) if ch < MAX_CHANNELS => Ok(Some(ch)),
            _ => Err(IoError::ChannelOutOfRange {
                channel,
                max: MAX_CHANNELS - 1,
            }),
        }
    }
}

impl<P: PwmBackend, D: DigitalOutput> ServoSink for ServoBank<P, D> {
    fn set_angle(&self, channel: i32, angle: i32) -> Result<Duration, IoError> {
        let Some(ch) = Self::check_channel(channel)? else {
            return Ok(Duration::ZERO);
        };
        let angle = angle.clamp(SERVO_MIN_ANGLE, SERVO_MAX_ANGLE);
        let pulse = angle_to_pulse(angle);

        let slot = self.channel(ch);
        let mut state = slot.lock();
        let hint = (state.last_pulse - pulse).abs() as u64;
        self.pwm.set_pwm(ch, 0, pulse as u16)?;
        state.last_pulse = pulse;
        state.angle = angle;

        Ok(Duration::from_millis(hint))
    }

    fn get_xy(&self, channel_x: i32, channel_y: i32) -> Point {
        let angle_of = |channel: i32| {
            u8::try_from(channel)
                .ok()
                .and_then(|ch| self.channels.read().get(&ch).map(|s| s.lock().angle))
                .unwrap_or(NEUTRAL_ANGLE)
        };
        Point::new(angle_of(channel_x), angle_of(channel_y))
    }

    fn reset(&self) -> Result<(), IoError> {
        let mut first_err = None;
        for ch in self.known_channels() {
            if let Err(e) = self.set_angle(i32::from(ch), NEUTRAL_ANGLE) {
                warn!("Failed to reset servo channel {}: {}", ch, e);
                first_err.get_or_insert(e);
            }
        }
        if !self.settle.is_zero() {
            std::thread::sleep(self.settle);
        }
        first_err.map_or(Ok(()), Err)
    }

    fn set_digital_pin(&self, pin: u32, active: bool) -> Result<(), IoError> {
        self.driven_pins.lock().insert(pin);
        self.pins.write(pin, active)
    }

    fn close(&self) -> Result<(), IoError> {
        let mut first_err = self.reset().err();

        let pins: Vec<u32> = std::mem::take(&mut *self.driven_pins.lock())
            .into_iter()
            .collect();
        for pin in pins {
            let result = self
                .pins
                .write(pin, false)
                .and_then(|_| self.pins.release(pin));
            if let Err(e) = result {
                warn!("Failed to release pin {}: {}", pin, e);
                first_err.get_or_insert(e);
            }
        }

        if let Err(e) = self.pwm.halt() {
            warn!("Failed to halt PWM backend: {}", e);
            first_err.get_or_insert(e);
        }
        debug!("Servo bank closed");
        first_err.map_or(Ok(()), Err)
    }
}
