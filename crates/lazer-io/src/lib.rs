//! # Lazer IO
//!
//! 硬件抽象层：舵机 / 数字输出 / 按键去抖
//!
//! ## 模块
//!
//! - `servo`: [`ServoBank`]，把角度换算为 PWM 计数，按通道加锁
//! - `memory`: 内存后端 [`MemoryPwm`] / [`MemoryPins`]（测试与模拟运行）
//! - `debounce`: 按键去抖状态机 [`Debouncer`] 与事件通道
//!
//! 真实的 GPIO / PCA9685 驱动只需实现 [`PwmBackend`] 与 [`DigitalOutput`]。

pub mod debounce;
pub mod memory;
pub mod servo;

pub use debounce::{ButtonInput, DebounceState, Debouncer, button_channel, DEBOUNCE_FLOOR};
pub use memory::{MemoryPins, MemoryPwm, PwmWrite};
pub use servo::{ServoBank, angle_to_pulse, MAX_CHANNELS};

use lazer_protocol::Point;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// 硬件层错误
#[derive(Error, Debug)]
pub enum IoError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(#[from] IoDeviceError),
    #[error("Servo channel {channel} out of range (max {max})")]
    ChannelOutOfRange { channel: i32, max: u8 },
    #[error("Device closed")]
    Closed,
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoDeviceErrorKind {
    Unknown,
    NotFound,
    AccessDenied,
    Busy,
    InvalidResponse,
    Backend,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct IoDeviceError {
    pub kind: IoDeviceErrorKind,
    pub message: String,
}

impl IoDeviceError {
    pub fn new(kind: IoDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// 构造期遇到这些错误时应当放弃启动
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            IoDeviceErrorKind::NotFound | IoDeviceErrorKind::AccessDenied
        )
    }
}

impl From<String> for IoDeviceError {
    fn from(message: String) -> Self {
        Self::new(IoDeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for IoDeviceError {
    fn from(message: &str) -> Self {
        Self::new(IoDeviceErrorKind::Unknown, message)
    }
}

/// PWM 输出后端（如 PCA9685）
///
/// 方法取 `&self`：后端自行负责内部同步。
pub trait PwmBackend: Send + Sync {
    /// 设置通道的 on/off 计数（12 位）
    fn set_pwm(&self, channel: u8, on: u16, off: u16) -> Result<(), IoError>;

    /// 停止所有输出
    fn halt(&self) -> Result<(), IoError> {
        Ok(())
    }
}

/// 数字输出引脚后端（GPIO line）
pub trait DigitalOutput: Send + Sync {
    fn write(&self, pin: u32, active: bool) -> Result<(), IoError>;

    /// 释放引脚（恢复为输入）
    fn release(&self, _pin: u32) -> Result<(), IoError> {
        Ok(())
    }
}

impl<T: PwmBackend + ?Sized> PwmBackend for Arc<T> {
    fn set_pwm(&self, channel: u8, on: u16, off: u16) -> Result<(), IoError> {
        (**self).set_pwm(channel, on, off)
    }

    fn halt(&self) -> Result<(), IoError> {
        (**self).halt()
    }
}

impl<T: DigitalOutput + ?Sized> DigitalOutput for Arc<T> {
    fn write(&self, pin: u32, active: bool) -> Result<(), IoError> {
        (**self).write(pin, active)
    }

    fn release(&self, pin: u32) -> Result<(), IoError> {
        (**self).release(pin)
    }
}

/// 控制器看到的舵机与输出接口
///
/// 通道号为负表示 "未接"：对应命令是空操作，时间提示为 0。
/// 返回的 `Duration` 是时间提示（新旧脉宽之差，单位按毫秒解释），
/// 调用方据此决定下一步前的等待时间。
pub trait ServoSink: Send + Sync {
    /// 设置单个通道的角度
    fn set_angle(&self, channel: i32, angle: i32) -> Result<Duration, IoError>;

    /// 设置 X/Y 两个通道，返回两者时间提示之和
    ///
    /// 默认实现在调用线程上依次下发（每步不创建线程）；两个通道各自加锁，
    /// 舵机在物理上并行转动。任一通道失败时返回错误。
    fn set_xy(&self, channel_x: i32, channel_y: i32, x: i32, y: i32) -> Result<Duration, IoError> {
        let hint_x = self.set_angle(channel_x, x)?;
        let hint_y = self.set_angle(channel_y, y)?;
        Ok(hint_x + hint_y)
    }

    /// 最近一次下发的角度（开环：即认为的当前位置）
    fn get_xy(&self, channel_x: i32, channel_y: i32) -> Point;

    /// 所有已知通道回到中位
    fn reset(&self) -> Result<(), IoError>;

    fn set_digital_pin(&self, pin: u32, active: bool) -> Result<(), IoError>;

    /// 复位、关闭所有输出并释放后端
    fn close(&self) -> Result<(), IoError>;
}

impl<T: ServoSink + ?Sized> ServoSink for Arc<T> {
    fn set_angle(&self, channel: i32, angle: i32) -> Result<Duration, IoError> {
        (**self).set_angle(channel, angle)
    }

    fn set_xy(&self, channel_x: i32, channel_y: i32, x: i32, y: i32) -> Result<Duration, IoError> {
        (**self).set_xy(channel_x, channel_y, x, y)
    }

    fn get_xy(&self, channel_x: i32, channel_y: i32) -> Point {
        (**self).get_xy(channel_x, channel_y)
    }

    fn reset(&self) -> Result<(), IoError> {
        (**self).reset()
    }

    fn set_digital_pin(&self, pin: u32, active: bool) -> Result<(), IoError> {
        (**self).set_digital_pin(pin, active)
    }

    fn close(&self) -> Result<(), IoError> {
        (**self).close()
    }
}
