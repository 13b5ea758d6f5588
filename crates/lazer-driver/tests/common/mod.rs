//! 集成测试共用的硬件替身
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use lazer_driver::{CalibrationConfig, CancelToken, Controller, ControllerConfig, ManualClock};
use lazer_io::{IoError, MemoryPins, MemoryPwm, ServoBank, ServoSink};
use lazer_protocol::{ButtonEvent, ButtonId, Point};
use lazer_tools::MemoryStore;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

pub type Hook = Box<dyn Fn(&Arc<Controller>) + Send + Sync>;

/// 包装 `ServoBank` 的测试舵机
///
/// - 时间提示默认为 0，运动与校准不会真正等待；`set_hint` 可设为固定值
/// - 可以在某个通道到达某个角度时执行回调（模拟操作者按键）
/// - 可以在下一次复位时执行一次回调
pub struct TestSink {
    pub bank: ServoBank<Arc<MemoryPwm>, Arc<MemoryPins>>,
    pub pwm: Arc<MemoryPwm>,
    pub pins: Arc<MemoryPins>,
    controller: OnceLock<Weak<Controller>>,
    hooks: Mutex<BTreeMap<(i32, i32), Hook>>,
    on_reset: Mutex<Option<Hook>>,
    hint: Mutex<Duration>,
}

impl TestSink {
    pub fn new() -> Arc<Self> {
        let pwm = Arc::new(MemoryPwm::new());
        let pins = Arc::new(MemoryPins::new());
        Arc::new(Self {
            bank: ServoBank::new(Arc::clone(&pwm), Arc::clone(&pins)).with_settle(Duration::ZERO),
            pwm,
            pins,
            controller: OnceLock::new(),
            hooks: Mutex::new(BTreeMap::new()),
            on_reset: Mutex::new(None),
            hint: Mutex::new(Duration::ZERO),
        })
    }

    pub fn attach(&self, controller: &Arc<Controller>) {
        let _ = self.controller.set(Arc::downgrade(controller));
    }

    /// 通道 `channel` 被设置到 `angle` 时执行 `hook`
    pub fn on_angle(&self, channel: i32, angle: i32, hook: Hook) {
        self.hooks.lock().insert((channel, angle), hook);
    }

    /// 下一次 `reset` 时（复位之前）执行 `hook`，只执行一次
    pub fn on_next_reset(&self, hook: Hook) {
        *self.on_reset.lock() = Some(hook);
    }

    /// 之后每次 `set_angle` 返回的时间提示
    pub fn set_hint(&self, hint: Duration) {
        *self.hint.lock() = hint;
    }

    /// 在该角度模拟操作者短按右键
    pub fn mark_at(&self, channel: i32, angle: i32) {
        self.on_angle(
            channel,
            angle,
            Box::new(|ctrl: &Arc<Controller>| {
                let _ = ctrl.handle_button(ButtonId::Right, short_release());
            }),
        );
    }
}

impl ServoSink for TestSink {
    fn set_angle(&self, channel: i32, angle: i32) -> Result<Duration, IoError> {
        self.bank.set_angle(channel, angle)?;
        let hook = self.hooks.lock().remove(&(channel, angle));
        if let Some(hook) = hook
            && let Some(ctrl) = self.controller.get().and_then(Weak::upgrade)
        {
            hook(&ctrl);
        }
        Ok(*self.hint.lock())
    }

    fn get_xy(&self, channel_x: i32, channel_y: i32) -> Point {
        self.bank.get_xy(channel_x, channel_y)
    }

    fn reset(&self) -> Result<(), IoError> {
        let hook = self.on_reset.lock().take();
        if let Some(hook) = hook
            && let Some(ctrl) = self.controller.get().and_then(Weak::upgrade)
        {
            hook(&ctrl);
        }
        self.bank.reset()
    }

    fn set_digital_pin(&self, pin: u32, active: bool) -> Result<(), IoError> {
        self.bank.set_digital_pin(pin, active)
    }

    fn close(&self) -> Result<(), IoError> {
        self.bank.close()
    }
}

/// 所有等待都缩短到毫秒级的配置
pub fn fast_config() -> ControllerConfig {
    ControllerConfig {
        idle_tick: Duration::from_millis(10),
        schedule_tick: Duration::from_millis(10),
        idle_poll: Duration::from_millis(5),
        calibration: CalibrationConfig {
            settle: Duration::ZERO,
            delay_multiplier: 0,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// 2026-10-16（星期五）
pub fn friday_at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .and_then(|d| d.and_hms_opt(h, m, 0))
        .unwrap()
}

pub struct Harness {
    pub controller: Arc<Controller>,
    pub sink: Arc<TestSink>,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub cancel: CancelToken,
}

pub fn harness() -> Harness {
    harness_with(MemoryStore::new(), fast_config())
}

pub fn harness_with(store: MemoryStore, config: ControllerConfig) -> Harness {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let sink = TestSink::new();
    let store = Arc::new(store);
    let clock = Arc::new(ManualClock::new(friday_at(12, 0)));
    let cancel = CancelToken::new();
    let controller = Arc::new(Controller::new(
        Arc::clone(&sink) as Arc<dyn ServoSink>,
        Arc::clone(&store) as Arc<dyn lazer_tools::ConfigStore>,
        Arc::clone(&clock) as Arc<dyn lazer_driver::Clock>,
        config,
        cancel.clone(),
    ));
    sink.attach(&controller);
    Harness {
        controller,
        sink,
        store,
        clock,
        cancel,
    }
}

pub fn short_release() -> ButtonEvent {
    ButtonEvent::release(Duration::from_millis(300))
}

pub fn long_release() -> ButtonEvent {
    ButtonEvent::release(Duration::from_secs(3))
}

pub fn press(ctrl: &Arc<Controller>, button: ButtonId, event: ButtonEvent) {
    assert!(ctrl.handle_button(button, event).is_none());
}
