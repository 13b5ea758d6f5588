//! 交互式轴范围校准
//!
//! 把一个轴从 0 扫到 `sweep_end - 1`，操作者在扫描中两次按键标记可用范围：
//!
//! 1. 转到 0 度并等待稳定
//! 2. 每一步：下发角度 `i`，等待 `时间提示 × delay_multiplier`，非阻塞检查信号
//!    - 第一次信号：记录 `start = i`，继续扫描
//!    - 第二次信号：立即返回 `(start, i)`
//! 3. 扫描完毕仍不足两次信号：返回 `(start 或 0, sweep_end)`
//! 4. 任意时刻取消：返回 `(0, 180)`

use crate::cancel::CancelToken;
use crate::config::CalibrationConfig;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use lazer_io::ServoSink;
use lazer_protocol::{AxisRange, SERVO_MIN_ANGLE};
use tracing::{debug, info, warn};

/// 校准信号发送端（按键转发）
///
/// 容量为 1：已有未读信号时新信号被丢弃，而不是覆盖。
#[derive(Debug, Clone)]
pub struct CalibrationSignal {
    tx: Sender<()>,
}

impl CalibrationSignal {
    /// 创建信号通道
    pub fn channel() -> (CalibrationSignal, Receiver<()>) {
        let (tx, rx) = crossbeam_channel::bounded(1);
        (CalibrationSignal { tx }, rx)
    }

    /// 非阻塞发送，返回信号是否被接收
    pub fn notify(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) => {
                debug!("Calibration signal already pending, dropping");
                false
            },
            Err(TrySendError::Disconnected(())) => false,
        }
    }
}

/// 校准结果（是否被取消）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisCalibration {
    Completed(AxisRange),
    Cancelled,
}

impl AxisCalibration {
    /// 取消时回退到完整范围
    pub fn range(self) -> AxisRange {
        match self {
            AxisCalibration::Completed(range) => range,
            AxisCalibration::Cancelled => AxisRange::full(),
        }
    }
}

/// 扫描一个轴，返回操作者标记的范围
///
/// # 参数
///
/// - `sink`: 舵机接口
/// - `channel`: 被校准的通道
/// - `signals`: 校准信号接收端
/// - `cancel`: 取消令牌
/// - `config`: 扫描参数
pub fn calibrate_axis(
    sink: &dyn ServoSink,
    channel: i32,
    signals: &Receiver<()>,
    cancel: &CancelToken,
    config: &CalibrationConfig,
) -> AxisCalibration {
    info!("Calibrating servo channel {}", channel);

    if let Err(e) = sink.set_angle(channel, SERVO_MIN_ANGLE) {
        warn!("Calibration: failed to move channel {} to 0: {}", channel, e);
    }
    if cancel.wait(config.settle) {
        return AxisCalibration::Cancelled;
    }

    let mut start = None;
    for angle in SERVO_MIN_ANGLE..config.sweep_end {
        let hint = sink.set_angle(channel, angle).unwrap_or_else(|e| {
            warn!("Calibration: failed to set channel {} to {}: {}", channel, angle, e);
            Default::default()
        });
        if cancel.wait(hint * config.delay_multiplier) {
            info!("Calibration of channel {} cancelled", channel);
            return AxisCalibration::Cancelled;
        }

        if signals.try_recv().is_err() {
            continue;
        }
        match start {
            None => {
                info!("Channel {}: range start marked at {}", channel, angle);
                start = Some(angle);
            },
            Some(min) => {
                info!("Channel {}: range end marked at {}", channel, angle);
                return AxisCalibration::Completed(AxisRange::new(min, angle));
            },
        }
    }

    let min = start.unwrap_or(SERVO_MIN_ANGLE);
    info!(
        "Channel {}: sweep finished without end mark, using {}..{}",
        channel, min, config.sweep_end
    );
    AxisCalibration::Completed(AxisRange::new(min, config.sweep_end))
}
