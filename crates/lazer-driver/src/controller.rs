//! 控制器状态机
//!
//! 持有运行时快照、持久化配置和校准信号通道，响应按键、空闲超时和周计划，
//! 并提供运动循环的单次迭代。四个控制循环（见 `pipeline`）共享同一个
//! `Arc<Controller>`；所有共享字段都是原子或 ArcSwap，不存在裸的并发字段访问。
//! 状态转移（含其硬件副作用）由 `transition` 锁串行化。

use crate::calibration::{AxisCalibration, CalibrationSignal, calibrate_axis};
use crate::cancel::CancelToken;
use crate::clock::Clock;
use crate::config::ControllerConfig;
use crate::runtime::{Runtime, RuntimeSnapshot};
use arc_swap::ArcSwap;
use chrono::NaiveDateTime;
use crossbeam_channel::Receiver;
use lazer_control::{MotionPlan, PlanStep, random_style, random_target, scale_delay};
use lazer_io::{IoError, ServoSink};
use lazer_protocol::{
    ButtonEvent, ButtonId, Configuration, MovementStyle, OperatingState, Point, WeeklySchedule,
};
use lazer_tools::{ConfigStore, StoreError, find_active_entry};
use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

/// 一段运动的结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentEnd {
    /// 全部步骤执行完
    Completed,
    /// 收到取消信号
    Cancelled,
    /// 状态不再是运动状态（关闭或进入校准）
    Stopped,
    /// 舵机命令失败
    Failed,
}

/// 运动段执行报告
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentReport {
    pub style: MovementStyle,
    pub target: Point,
    /// 实际执行的步数
    pub steps: usize,
    pub end: SegmentEnd,
}

/// 控制器
pub struct Controller {
    sink: Arc<dyn ServoSink>,
    store: Arc<dyn ConfigStore>,
    clock: Arc<dyn Clock>,
    config: ControllerConfig,
    runtime: Runtime,
    /// 检查校准闸门与发布新状态之间不允许插入其他转移
    transition: Mutex<()>,
    configuration: ArcSwap<Configuration>,
    signal: CalibrationSignal,
    signals: Receiver<()>,
    cancel: CancelToken,
}

impl Controller {
    /// 创建控制器并从存储加载配置
    ///
    /// # 参数
    ///
    /// - `sink`: 舵机与输出引脚
    /// - `store`: 配置存储（加载失败时回退到默认配置）
    /// - `clock`: 时钟
    /// - `config`: 运行参数
    /// - `cancel`: 进程级取消令牌
    pub fn new(
        sink: Arc<dyn ServoSink>,
        store: Arc<dyn ConfigStore>,
        clock: Arc<dyn Clock>,
        config: ControllerConfig,
        cancel: CancelToken,
    ) -> Self {
        let configuration = store.load();
        let (signal, signals) = CalibrationSignal::channel();
        Self {
            runtime: Runtime::new(clock.instant()),
            transition: Mutex::new(()),
            sink,
            store,
            clock,
            config,
            configuration: ArcSwap::from_pointee(configuration),
            signal,
            signals,
            cancel,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn sink(&self) -> &Arc<dyn ServoSink> {
        &self.sink
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn state(&self) -> OperatingState {
        self.runtime.state()
    }

    pub fn snapshot(&self) -> RuntimeSnapshot {
        self.runtime.load()
    }

    pub fn is_configuring(&self) -> bool {
        self.runtime.is_configuring()
    }

    /// 当前配置（只读快照）
    pub fn configuration(&self) -> Arc<Configuration> {
        self.configuration.load_full()
    }

    pub fn schedule(&self) -> WeeklySchedule {
        self.configuration.load().schedule.clone()
    }

    /// 替换周计划并持久化完整配置
    ///
    /// 内存中的计划总是先更新；返回的错误只表示持久化失败。
    pub fn set_schedule(&self, schedule: WeeklySchedule) -> Result<(), StoreError> {
        self.configuration.rcu(|current| Configuration {
            schedule: schedule.clone(),
            ..(**current).clone()
        });
        info!("Schedule replaced ({} entries)", schedule.len());
        self.persist()
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.store.save(&self.configuration.load())
    }

    /// 状态转移
    ///
    /// - 校准进行中：丢弃
    /// - `Off`：舵机回中位，关闭输出引脚
    /// - `Configuring`：同步执行完整校准
    /// - `Slow`/`Medium`/`Fast`：设置速度
    ///
    /// 闸门在转移锁内检查；`Off` 的复位期间开始的校准要等本次转移发布后才能开始。
    pub fn change_state(&self, new: OperatingState, cause: &str) {
        let guard = self.transition.lock();
        if self.runtime.is_configuring() {
            debug!("Transition to {} ({}) dropped: calibration in progress", new, cause);
            return;
        }

        match new {
            OperatingState::Off => {
                if let Err(e) = self.sink.reset() {
                    error!("Failed to reset servos: {}", e);
                }
                self.set_duty(false);
            },
            OperatingState::Configuring => {
                if !self.runtime.try_begin_configuring() {
                    return;
                }
                self.publish(OperatingState::Configuring, cause);
                drop(guard);
                self.calibrate();
                return;
            },
            OperatingState::Slow | OperatingState::Medium | OperatingState::Fast => {},
        }

        self.publish(new, cause);
    }

    /// 直接置为 `Off`，不复位舵机也不关闭输出（急停）
    pub fn force_off(&self, cause: &str) {
        let _guard = self.transition.lock();
        if self.runtime.is_configuring() {
            debug!("Stop ({}) dropped: calibration in progress", cause);
            return;
        }
        self.publish(OperatingState::Off, cause);
    }

    /// 在后台线程中开始校准
    ///
    /// 校准闸门在返回前已经关闭，之后的按键事件会被转发给校准。
    /// 已在校准中或线程创建失败时返回 `None`。
    pub fn start_calibration(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        {
            let _guard = self.transition.lock();
            if !self.runtime.try_begin_configuring() {
                debug!("Calibration already running");
                return None;
            }
            self.publish(OperatingState::Configuring, "left button long press");
        }

        let this = Arc::clone(self);
        match std::thread::Builder::new()
            .name("lazer-calibration".into())
            .spawn(move || this.calibrate())
        {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Failed to spawn calibration thread: {}", e);
                self.runtime.end_configuring();
                None
            },
        }
    }

    fn calibrate(&self) {
        info!("Calibration started");
        // 清掉上一次校准遗留的信号
        while self.signals.try_recv().is_ok() {}

        let cal = &self.config.calibration;
        let x = calibrate_axis(
            self.sink.as_ref(),
            self.config.channel_x,
            &self.signals,
            &self.cancel,
            cal,
        );
        let y = match x {
            AxisCalibration::Cancelled => AxisCalibration::Cancelled,
            AxisCalibration::Completed(_) => calibrate_axis(
                self.sink.as_ref(),
                self.config.channel_y,
                &self.signals,
                &self.cancel,
                cal,
            ),
        };

        match (x, y) {
            (AxisCalibration::Completed(x_range), AxisCalibration::Completed(y_range)) => {
                let (x_range, y_range) = (x_range.normalized(), y_range.normalized());
                self.configuration.rcu(|current| Configuration {
                    x_range,
                    y_range,
                    ..(**current).clone()
                });
                info!(
                    "Calibration finished: x {}..{}, y {}..{}",
                    x_range.min_angle, x_range.max_angle, y_range.min_angle, y_range.max_angle
                );
                if let Err(e) = self.persist() {
                    error!("Failed to persist calibrated configuration: {}", e);
                }
                if let Err(e) = self.sink.reset() {
                    error!("Failed to reset servos after calibration: {}", e);
                }
            },
            _ => warn!("Calibration cancelled, keeping previous ranges"),
        }

        self.runtime.end_configuring();
    }

    /// 处理一次去抖后的按键事件
    ///
    /// 只有松开事件参与逻辑。返回左键长按启动的校准线程句柄。
    pub fn handle_button(
        self: &Arc<Self>,
        button: ButtonId,
        event: ButtonEvent,
    ) -> Option<JoinHandle<()>> {
        if !event.is_release() {
            trace!("{} button press edge ignored", button);
            return None;
        }
        if self.runtime.is_configuring() {
            debug!("{} button release forwarded to calibration", button);
            self.signal.notify();
            return None;
        }

        let long_press = event.hold > self.config.long_press;
        debug!("{} button released after {:?}", button, event.hold);

        match (button, long_press) {
            (ButtonId::Left, true) => return self.start_calibration(),
            (ButtonId::Left, false) => self.change_state(OperatingState::Off, "left button"),
            (ButtonId::Right, true) => self.force_off("right button long press"),
            (ButtonId::Right, false) => {
                self.set_duty(true);
                let now = self.clock.instant();
                self.runtime.update(|s| s.active_since = now);
                let next = self.state().next_speed();
                self.change_state(next, "right button");
            },
        }
        None
    }

    /// 空闲超时检查，返回是否触发了关闭
    pub fn check_idle(&self, now: Instant) -> bool {
        let snapshot = self.runtime.load();
        if !snapshot.state.is_moving() {
            return false;
        }
        let active_for = now.saturating_duration_since(snapshot.active_since);
        if active_for <= self.config.max_active_duration {
            return false;
        }
        info!("No activity for {:?}, switching off", active_for);
        self.change_state(OperatingState::Off, "idle timeout");
        true
    }

    /// 周计划检查，返回命中记录的目标状态
    ///
    /// 校准进行中不做任何事，返回 `None`。
    pub fn check_schedule(&self, now: NaiveDateTime, instant: Instant) -> Option<OperatingState> {
        let configuration = self.configuration.load();
        let entry = find_active_entry(&configuration.schedule, now)?;
        let state = entry.state;
        if self.runtime.is_configuring() {
            debug!("Schedule entry {} skipped: calibration in progress", entry.start_time);
            return None;
        }
        debug!("Schedule entry {} matched at {}", entry.start_time, now);

        self.runtime.update(|s| s.active_since = instant);
        self.change_state(state, "schedule");
        Some(state)
    }

    /// 运动循环的一次迭代
    ///
    /// 非运动状态时关闭输出引脚并等待 `idle_poll`，返回 `None`；
    /// 否则随机决定输出引脚、目标点和样式，执行一段运动。
    pub fn motion_iteration<R: Rng>(&self, rng: &mut R) -> Option<SegmentReport> {
        if !self.state().is_moving() {
            self.set_duty(false);
            self.cancel.wait(self.config.idle_poll);
            return None;
        }

        let active = rng.r#gen::<f64>() <= self.config.pulse_duty_probability;
        self.set_duty(active);

        let configuration = self.configuration.load();
        let target = random_target(configuration.x_range, configuration.y_range, rng);
        let style = random_style(self.config.include_pause_styles, rng);
        let current = self.sink.get_xy(self.config.channel_x, self.config.channel_y);
        debug!("Moving {} -> {} ({})", current, target, style);

        let plan = MotionPlan::new(current, target, style, &mut *rng);
        Some(self.run_segment(plan))
    }

    /// 逐步执行运动计划
    ///
    /// 每步之前检查取消和状态；步间等待按当前速度缩放，可被取消打断。
    pub fn run_segment<R: Rng>(&self, plan: MotionPlan<R>) -> SegmentReport {
        let style = plan.style();
        let target = plan.target();
        let mut steps = 0;

        let end = 'run: {
            for step in plan {
                if self.cancel.is_cancelled() {
                    break 'run SegmentEnd::Cancelled;
                }
                let snapshot = self.runtime.load();
                if !snapshot.state.is_moving() {
                    break 'run SegmentEnd::Stopped;
                }

                let wait = match step {
                    PlanStep::Move(p) => {
                        match self
                            .sink
                            .set_xy(self.config.channel_x, self.config.channel_y, p.x, p.y)
                        {
                            Ok(hint) => scale_delay(hint, snapshot.speed),
                            Err(e) => {
                                error!("Failed to move to {}: {}", p, e);
                                break 'run SegmentEnd::Failed;
                            },
                        }
                    },
                    PlanStep::Pause(pause) => {
                        debug!("Pausing for {:?}", pause);
                        pause
                    },
                };
                steps += 1;

                if self.cancel.wait(wait) {
                    break 'run SegmentEnd::Cancelled;
                }
            }
            SegmentEnd::Completed
        };

        SegmentReport {
            style,
            target,
            steps,
            end,
        }
    }

    /// 复位并关闭硬件
    pub fn close(&self) -> Result<(), IoError> {
        self.sink.close()
    }

    fn set_duty(&self, active: bool) {
        if let Err(e) = self.sink.set_digital_pin(self.config.duty_pin, active) {
            error!(
                "Failed to set duty pin {} to {}: {}",
                self.config.duty_pin, active, e
            );
        }
    }

    fn publish(&self, new: OperatingState, cause: &str) {
        let previous = self.runtime.update(|s| {
            s.state = new;
            if let Some(speed) = new.speed() {
                s.speed = speed;
            }
        });
        if previous.state != new {
            info!("State {} -> {} ({})", previous.state, new, cause);
        } else {
            debug!("State {} re-applied ({})", new, cause);
        }
    }
}
