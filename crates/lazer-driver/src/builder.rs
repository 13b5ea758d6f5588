//! Builder 模式实现
//!
//! 提供链式构造 `Lazer` 实例的便捷方式。

use crate::cancel::CancelToken;
use crate::clock::{Clock, SystemClock};
use crate::config::ControllerConfig;
use crate::controller::Controller;
use crate::error::DriverError;
use crate::lazer::Lazer;
use crossbeam_channel::Receiver;
use lazer_io::ServoSink;
use lazer_protocol::ButtonEvent;
use lazer_tools::{ConfigStore, JsonFileStore};
use std::sync::Arc;

/// Lazer Builder（链式构造）
///
/// 舵机接口与左右按键事件源是必需的；配置存储默认为工作目录下的
/// `.lazer.config.json`，时钟默认为系统时钟。
///
/// # Example
///
/// ```no_run
/// use lazer_driver::LazerBuilder;
/// use lazer_io::{MemoryPins, MemoryPwm, ServoBank, button_channel};
/// use lazer_protocol::ButtonId;
/// use std::sync::Arc;
///
/// let (_left_input, left) = button_channel(ButtonId::Left);
/// let (_right_input, right) = button_channel(ButtonId::Right);
/// let lazer = LazerBuilder::new()
///     .servo_sink(Arc::new(ServoBank::new(MemoryPwm::new(), MemoryPins::new())))
///     .buttons(left, right)
///     .seed(7)
///     .build()
///     .unwrap();
/// ```
#[derive(Default)]
pub struct LazerBuilder {
    sink: Option<Arc<dyn ServoSink>>,
    left: Option<Receiver<ButtonEvent>>,
    right: Option<Receiver<ButtonEvent>>,
    store: Option<Arc<dyn ConfigStore>>,
    clock: Option<Arc<dyn Clock>>,
    config: Option<ControllerConfig>,
    cancel: Option<CancelToken>,
    seed: Option<u64>,
}

impl LazerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn servo_sink(mut self, sink: Arc<dyn ServoSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// 左右按键的去抖事件源
    pub fn buttons(mut self, left: Receiver<ButtonEvent>, right: Receiver<ButtonEvent>) -> Self {
        self.left = Some(left);
        self.right = Some(right);
        self
    }

    pub fn config_store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn controller_config(mut self, config: ControllerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 使用外部取消令牌（例如由信号处理器触发）
    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// 固定运动循环的随机种子
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 只构造控制器，不启动线程
    pub fn build_controller(&mut self) -> Result<Arc<Controller>, DriverError> {
        let sink = self
            .sink
            .take()
            .ok_or_else(|| DriverError::Construction("servo sink is required".into()))?;
        let store = self
            .store
            .take()
            .unwrap_or_else(|| Arc::new(JsonFileStore::default()) as Arc<dyn ConfigStore>);
        let clock = self
            .clock
            .take()
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let config = self.config.take().unwrap_or_default();
        validate(&config)?;
        let cancel = self.cancel.take().unwrap_or_default();

        Ok(Arc::new(Controller::new(sink, store, clock, config, cancel)))
    }

    /// 构造控制器并启动四个控制循环
    pub fn build(mut self) -> Result<Lazer, DriverError> {
        let (left, right) = match (self.left.take(), self.right.take()) {
            (Some(left), Some(right)) => (left, right),
            _ => {
                return Err(DriverError::Construction(
                    "left and right button sources are required".into(),
                ));
            },
        };
        let seed = self.seed;
        let controller = self.build_controller()?;
        Lazer::start(controller, left, right, seed)
    }
}

fn validate(config: &ControllerConfig) -> Result<(), DriverError> {
    if !(0.0..=1.0).contains(&config.pulse_duty_probability) {
        return Err(DriverError::Construction(format!(
            "pulse_duty_probability must be within 0..=1, got {}",
            config.pulse_duty_probability
        )));
    }
    if config.idle_tick.is_zero() || config.schedule_tick.is_zero() {
        return Err(DriverError::Construction(
            "idle_tick and schedule_tick must be non-zero".into(),
        ));
    }
    Ok(())
}
