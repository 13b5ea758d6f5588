//! 控制循环模块
//!
//! 四个长期运行的循环，各自在独立线程中执行，直到取消令牌触发：
//!
//! - `event_loop`: 读取左右按键事件，驱动状态机
//! - `motion_loop`: 运动状态下不断选择目标并执行运动段
//! - `idle_loop`: 每个 `idle_tick` 检查空闲超时
//! - `schedule_loop`: 每个 `schedule_tick` 检查周计划
//!
//! 单次迭代中的错误只记录日志，不会终止循环，也不会影响其他循环。

use crate::cancel::CancelToken;
use crate::controller::{Controller, SegmentEnd};
use crossbeam_channel::{Receiver, select};
use lazer_protocol::{ButtonEvent, ButtonId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, trace, warn};

/// 按键事件循环
///
/// 某个按键的通道断开后只停止监听该按键；两个都断开时循环退出。
pub fn event_loop(
    ctrl: Arc<Controller>,
    left: Receiver<ButtonEvent>,
    right: Receiver<ButtonEvent>,
    cancel: CancelToken,
) {
    debug!("Event loop started");
    let never = crossbeam_channel::never();
    let mut left_open = true;
    let mut right_open = true;
    let mut calibrations: Vec<JoinHandle<()>> = Vec::new();

    while left_open || right_open {
        let l = if left_open { &left } else { &never };
        let r = if right_open { &right } else { &never };

        let (button, event) = select! {
            recv(cancel.receiver()) -> _ => break,
            recv(l) -> msg => match msg {
                Ok(event) => (ButtonId::Left, event),
                Err(_) => {
                    warn!("Left button channel closed");
                    left_open = false;
                    continue;
                },
            },
            recv(r) -> msg => match msg {
                Ok(event) => (ButtonId::Right, event),
                Err(_) => {
                    warn!("Right button channel closed");
                    right_open = false;
                    continue;
                },
            },
        };

        trace!("{} button event: {:?}", button, event);
        if let Some(handle) = ctrl.handle_button(button, event) {
            calibrations.push(handle);
        }
        calibrations.retain(|h| !h.is_finished());
    }

    // 校准线程在取消后很快返回
    for handle in calibrations {
        if handle.join().is_err() {
            warn!("Calibration thread panicked");
        }
    }
    debug!("Event loop exited");
}

/// 运动循环
///
/// `seed` 为 `None` 时使用系统熵初始化随机源。
pub fn motion_loop(ctrl: Arc<Controller>, cancel: CancelToken, seed: Option<u64>) {
    debug!("Motion loop started");
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    while !cancel.is_cancelled() {
        let Some(report) = ctrl.motion_iteration(&mut rng) else {
            continue;
        };
        match report.end {
            SegmentEnd::Failed => {
                warn!(
                    "Motion segment to {} failed after {} steps",
                    report.target, report.steps
                );
                // 硬件持续故障时不要空转
                cancel.wait(ctrl.config().idle_poll);
            },
            end => trace!(
                "Motion segment {} to {}: {:?} after {} steps",
                report.style, report.target, end, report.steps
            ),
        }
    }
    debug!("Motion loop exited");
}

/// 空闲超时循环
pub fn idle_loop(ctrl: Arc<Controller>, cancel: CancelToken) {
    debug!("Idle loop started");
    let tick = ctrl.config().idle_tick;
    while !cancel.wait(tick) {
        ctrl.check_idle(ctrl.clock().instant());
    }
    debug!("Idle loop exited");
}

/// 周计划循环
pub fn schedule_loop(ctrl: Arc<Controller>, cancel: CancelToken) {
    debug!("Schedule loop started");
    let tick = ctrl.config().schedule_tick;
    while !cancel.wait(tick) {
        let clock = ctrl.clock();
        ctrl.check_schedule(clock.local(), clock.instant());
    }
    debug!("Schedule loop exited");
}
