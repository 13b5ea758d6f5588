//! 并发编排
//!
//! `Lazer` 启动四个命名线程运行控制循环，关闭时取消令牌、逐个带超时 join，
//! 最后执行硬件关闭序列（回中位、关闭输出、释放后端）。

use crate::cancel::CancelToken;
use crate::controller::Controller;
use crate::error::DriverError;
use crate::pipeline::{event_loop, idle_loop, motion_loop, schedule_loop};
use crossbeam_channel::Receiver;
use lazer_protocol::ButtonEvent;
use std::sync::Arc;
use std::thread::{JoinHandle, spawn};
use std::time::Duration;
use tracing::{error, info};

/// Extension trait: join with a timeout.
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()>;
}

impl<T: Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()> {
        let (tx, rx) = crossbeam_channel::bounded(1);

        // Watchdog joins the target and reports back; it outlives us on timeout.
        spawn(move || {
            let _ = tx.send(self.join());
        });

        match rx.recv_timeout(timeout) {
            Ok(join_result) => join_result.map(|_| ()),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => Err(Box::new(
                std::io::Error::new(std::io::ErrorKind::TimedOut, "Thread join timeout"),
            )),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => Err(Box::new(
                std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "Thread panicked during join",
                ),
            )),
        }
    }
}

/// 每个线程的 join 超时
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// 运行中的激光控制器
///
/// Drop 时若尚未关闭，会自动执行 [`shutdown`](Lazer::shutdown)。
pub struct Lazer {
    controller: Arc<Controller>,
    cancel: CancelToken,
    threads: Vec<(&'static str, JoinHandle<()>)>,
    closed: bool,
}

impl Lazer {
    /// 启动四个控制循环
    pub(crate) fn start(
        controller: Arc<Controller>,
        left: Receiver<ButtonEvent>,
        right: Receiver<ButtonEvent>,
        seed: Option<u64>,
    ) -> Result<Self, DriverError> {
        let cancel = controller.cancel_token().clone();
        let mut lazer = Lazer {
            controller: Arc::clone(&controller),
            cancel: cancel.clone(),
            threads: Vec::with_capacity(4),
            closed: false,
        };

        // 任意一个线程创建失败时，已创建的线程由 Drop 中的 shutdown 回收
        lazer.spawn("lazer-events", {
            let (ctrl, cancel) = (Arc::clone(&controller), cancel.clone());
            move || event_loop(ctrl, left, right, cancel)
        })?;
        lazer.spawn("lazer-motion", {
            let (ctrl, cancel) = (Arc::clone(&controller), cancel.clone());
            move || motion_loop(ctrl, cancel, seed)
        })?;
        lazer.spawn("lazer-idle", {
            let (ctrl, cancel) = (Arc::clone(&controller), cancel.clone());
            move || idle_loop(ctrl, cancel)
        })?;
        lazer.spawn("lazer-schedule", {
            let (ctrl, cancel) = (Arc::clone(&controller), cancel.clone());
            move || schedule_loop(ctrl, cancel)
        })?;

        info!("Lazer controller started");
        Ok(lazer)
    }

    fn spawn<F>(&mut self, name: &'static str, f: F) -> Result<(), DriverError>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = std::thread::Builder::new()
            .name(name.into())
            .spawn(f)
            .map_err(|source| DriverError::ThreadSpawn { name, source })?;
        self.threads.push((name, handle));
        Ok(())
    }

    pub fn controller(&self) -> &Arc<Controller> {
        &self.controller
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// 阻塞直到所有循环退出（即取消令牌被触发），然后关闭硬件
    pub fn wait(&mut self) {
        for (name, handle) in self.threads.drain(..) {
            if handle.join().is_err() {
                error!("{} thread panicked", name);
            }
        }
        self.close_hardware();
    }

    /// 取消所有循环，带超时 join，然后关闭硬件
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        info!("Shutting down lazer controller");
        self.cancel.cancel();

        for (name, handle) in self.threads.drain(..) {
            if let Err(_e) = handle.join_timeout(JOIN_TIMEOUT) {
                error!(
                    "{} thread panicked or failed to shut down within {:?}",
                    name, JOIN_TIMEOUT
                );
            }
        }
        self.close_hardware();
    }

    fn close_hardware(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.controller.close() {
            error!("Hardware close sequence failed: {}", e);
        }
        info!("Lazer controller stopped");
    }
}

impl Drop for Lazer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
