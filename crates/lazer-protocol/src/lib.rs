//! # Lazer Protocol
//!
//! 激光云台控制器的数据模型（无硬件依赖）
//!
//! ## 模块
//!
//! - `state`: 运行状态 `OperatingState`
//! - `style`: 运动样式 `MovementStyle`
//! - `point`: 二维角度坐标 `Point`
//! - `config`: 轴范围、周计划与持久化配置
//! - `button`: 按键事件
//!
//! ## JSON 格式
//!
//! 所有可持久化类型都实现了 serde，字段名使用 camelCase，
//! 与配置文件和 HTTP 接口共用同一套格式。

pub mod button;
pub mod config;
pub mod point;
pub mod state;
pub mod style;

// 重新导出常用类型
pub use button::*;
pub use config::*;
pub use point::*;
pub use state::*;
pub use style::*;

use thiserror::Error;

/// 舵机可接受的最小角度（度）
pub const SERVO_MIN_ANGLE: i32 = 0;

/// 舵机可接受的最大角度（度）
pub const SERVO_MAX_ANGLE: i32 = 180;

/// 中位角度，复位时使用
pub const NEUTRAL_ANGLE: i32 = 90;

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid time format (expected HH:MM): {0:?}")]
    InvalidTimeFormat(String),

    #[error("Unknown operating state name: {0:?}")]
    UnknownState(String),

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: &'static str, value: u64 },
}
