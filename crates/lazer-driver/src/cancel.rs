//! 取消令牌
//!
//! 进程级的取消信号：所有控制循环、校准扫描和运动计划在每次阻塞等待前检查它。
//! 内部是一个从不发送的 crossbeam 通道，`cancel()` 丢弃发送端，
//! 所有在接收端上等待的线程立即被唤醒。

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Debug)]
struct Inner {
    tx: Mutex<Option<Sender<()>>>,
    rx: Receiver<()>,
    cancelled: AtomicBool,
}

/// 可克隆的取消令牌
#[derive(Debug, Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::bounded(0);
        Self {
            inner: Arc::new(Inner {
                tx: Mutex::new(Some(tx)),
                rx,
                cancelled: AtomicBool::new(false),
            }),
        }
    }

    /// 触发取消（幂等）
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.tx.lock().take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// 最多等待 `timeout`，期间被取消则立即返回 `true`
    pub fn wait(&self, timeout: Duration) -> bool {
        if self.is_cancelled() {
            return true;
        }
        match self.inner.rx.recv_timeout(timeout) {
            Err(RecvTimeoutError::Disconnected) => true,
            Err(RecvTimeoutError::Timeout) | Ok(()) => self.is_cancelled(),
        }
    }

    /// 用于 `select!` 的接收端：取消后立即就绪（Disconnected）
    pub fn receiver(&self) -> &Receiver<()> {
        &self.inner.rx
    }
}
