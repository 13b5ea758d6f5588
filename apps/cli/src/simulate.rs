//! 模拟硬件
//!
//! 没有真实 PWM / GPIO 时使用：只把输出写进日志，不保存历史，
//! 可以长时间运行。

use lazer_io::{DigitalOutput, IoError, PwmBackend, ServoBank, ServoSink};
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug, Default)]
pub struct TracePwm;

impl PwmBackend for TracePwm {
    fn set_pwm(&self, channel: u8, on: u16, off: u16) -> Result<(), IoError> {
        trace!("pwm channel {}: on={} off={}", channel, on, off);
        Ok(())
    }

    fn halt(&self) -> Result<(), IoError> {
        debug!("pwm halted");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct TracePins;

impl DigitalOutput for TracePins {
    fn write(&self, pin: u32, active: bool) -> Result<(), IoError> {
        trace!("pin {} -> {}", pin, if active { "high" } else { "low" });
        Ok(())
    }

    fn release(&self, pin: u32) -> Result<(), IoError> {
        debug!("pin {} released", pin);
        Ok(())
    }
}

/// 模拟的舵机组
pub fn servo_sink() -> Arc<dyn ServoSink> {
    Arc::new(ServoBank::new(TracePwm, TracePins))
}
