//! 控制器运行参数（不持久化）

use std::time::Duration;

/// 控制器配置
///
/// # Example
///
/// ```
/// use lazer_driver::{CalibrationConfig, ControllerConfig};
/// use std::time::Duration;
///
/// // 默认配置（X=通道 1，Y=通道 0，输出引脚 23）
/// let config = ControllerConfig::default();
/// assert_eq!(config.max_active_duration, Duration::from_secs(30 * 60));
///
/// // 测试中缩短所有等待
/// let fast = ControllerConfig {
///     idle_poll: Duration::from_millis(5),
///     calibration: CalibrationConfig {
///         settle: Duration::ZERO,
///         delay_multiplier: 0,
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// X 轴舵机通道（负数表示未接）
    pub channel_x: i32,
    /// Y 轴舵机通道
    pub channel_y: i32,
    /// 脉冲输出引脚（激光）
    pub duty_pin: u32,
    /// 长按阈值：按住时长严格大于该值视为长按
    pub long_press: Duration,
    /// 无按键活动时的最长运行时间
    pub max_active_duration: Duration,
    /// 每次运动迭代保持输出引脚有效的概率
    pub pulse_duty_probability: f64,
    /// 空闲超时检查周期
    pub idle_tick: Duration,
    /// 周计划检查周期
    pub schedule_tick: Duration,
    /// 非运动状态下运动循环的轮询间隔
    pub idle_poll: Duration,
    /// 随机样式是否包含停顿样式
    pub include_pause_styles: bool,
    /// 校准参数
    pub calibration: CalibrationConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            channel_x: 1,
            channel_y: 0,
            duty_pin: 23,
            long_press: Duration::from_secs(2),
            max_active_duration: Duration::from_secs(30 * 60),
            pulse_duty_probability: 0.9,
            idle_tick: Duration::from_secs(1),
            schedule_tick: Duration::from_secs(60),
            idle_poll: Duration::from_secs(1),
            include_pause_styles: false,
            calibration: CalibrationConfig::default(),
        }
    }
}

/// 校准扫描参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationConfig {
    /// 回到 0 度后的稳定等待
    pub settle: Duration,
    /// 每步等待 = 时间提示 × 该倍数（给人留出反应时间）
    pub delay_multiplier: u32,
    /// 扫描上界（不含），扫描结束时的回退最大值
    pub sweep_end: i32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            settle: Duration::from_secs(1),
            delay_multiplier: 4,
            sweep_end: lazer_protocol::SERVO_MAX_ANGLE,
        }
    }
}
