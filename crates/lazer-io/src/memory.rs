//! 内存后端
//!
//! 不接触硬件，只记录写入；用于测试与 `lazer run` 的模拟运行。
//! `set_fail(true)` 之后所有写入返回设备错误，用来模拟硬件故障。

use crate::{DigitalOutput, IoDeviceError, IoDeviceErrorKind, IoError, PwmBackend};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

/// 一次 PWM 写入
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmWrite {
    pub channel: u8,
    pub on: u16,
    pub off: u16,
}

#[derive(Debug, Default)]
pub struct MemoryPwm {
    writes: Mutex<Vec<PwmWrite>>,
    fail: AtomicBool,
    halted: AtomicBool,
}

impl MemoryPwm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::Release);
    }

    pub fn writes(&self) -> Vec<PwmWrite> {
        self.writes.lock().clone()
    }

    pub fn last_write(&self, channel: u8) -> Option<PwmWrite> {
        self.writes
            .lock()
            .iter()
            .rev()
            .find(|w| w.channel == channel)
            .copied()
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }
}

impl PwmBackend for MemoryPwm {
    fn set_pwm(&self, channel: u8, on: u16, off: u16) -> Result<(), IoError> {
        if self.fail.load(Ordering::Acquire) {
            return Err(IoDeviceError::new(
                IoDeviceErrorKind::Backend,
                format!("simulated PWM failure on channel {channel}"),
            )
            .into());
        }
        self.writes.lock().push(PwmWrite { channel, on, off });
        Ok(())
    }

    fn halt(&self) -> Result<(), IoError> {
        self.halted.store(true, Ordering::Release);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryPins {
    levels: Mutex<BTreeMap<u32, bool>>,
    history: Mutex<Vec<(u32, bool)>>,
    released: Mutex<BTreeSet<u32>>,
    fail: AtomicBool,
}

impl MemoryPins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::Release);
    }

    /// 引脚当前电平（从未写过时为 `None`）
    pub fn level(&self, pin: u32) -> Option<bool> {
        self.levels.lock().get(&pin).copied()
    }

    /// 全部写入记录（按时间顺序）
    pub fn history(&self) -> Vec<(u32, bool)> {
        self.history.lock().clone()
    }

    pub fn is_released(&self, pin: u32) -> bool {
        self.released.lock().contains(&pin)
    }
}

impl DigitalOutput for MemoryPins {
    fn write(&self, pin: u32, active: bool) -> Result<(), IoError> {
        if self.fail.load(Ordering::Acquire) {
            return Err(IoDeviceError::new(
                IoDeviceErrorKind::Backend,
                format!("simulated write failure on pin {pin}"),
            )
            .into());
        }
        self.levels.lock().insert(pin, active);
        self.history.lock().push((pin, active));
        self.released.lock().remove(&pin);
        Ok(())
    }

    fn release(&self, pin: u32) -> Result<(), IoError> {
        self.released.lock().insert(pin);
        Ok(())
    }
}
