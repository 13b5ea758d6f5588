//! 驱动层模块
//!
//! 本模块提供激光云台控制器的核心逻辑，包括：
//! - 状态机（`Off`/`Configuring`/`Slow`/`Medium`/`Fast`）与按键语义
//! - 交互式轴范围校准
//! - 四个控制循环（按键、运动、空闲超时、周计划）
//! - 并发编排与关闭（取消令牌、带超时 join、硬件关闭序列）
//!
//! 运行时状态使用 ArcSwap 快照，循环之间没有裸的共享可变字段。

mod builder;
pub mod calibration;
pub mod cancel;
pub mod clock;
pub mod config;
pub mod controller;
mod error;
mod lazer;
pub mod pipeline;
pub mod runtime;

pub use builder::LazerBuilder;
pub use calibration::{AxisCalibration, CalibrationSignal, calibrate_axis};
pub use cancel::CancelToken;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CalibrationConfig, ControllerConfig};
pub use controller::{Controller, SegmentEnd, SegmentReport};
pub use error::DriverError;
pub use lazer::{JOIN_TIMEOUT, Lazer};
pub use pipeline::{event_loop, idle_loop, motion_loop, schedule_loop};
pub use runtime::{Runtime, RuntimeSnapshot};
