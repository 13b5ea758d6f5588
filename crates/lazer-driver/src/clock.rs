//! 时钟抽象
//!
//! 单调时间（`Instant`）用于空闲超时，本地墙钟（`NaiveDateTime`）用于周计划。

use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    /// 单调时间
    fn instant(&self) -> Instant;

    /// 本地墙钟时间
    fn local(&self) -> NaiveDateTime;
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn instant(&self) -> Instant {
        Instant::now()
    }

    fn local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// 手动推进的时钟（测试用）
#[derive(Debug)]
pub struct ManualClock {
    base_instant: Instant,
    base_local: NaiveDateTime,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new(local: NaiveDateTime) -> Self {
        Self {
            base_instant: Instant::now(),
            base_local: local,
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Clock for ManualClock {
    fn instant(&self) -> Instant {
        self.base_instant + *self.offset.lock()
    }

    fn local(&self) -> NaiveDateTime {
        let offset = *self.offset.lock();
        chrono::TimeDelta::from_std(offset)
            .ok()
            .and_then(|d| self.base_local.checked_add_signed(d))
            .unwrap_or(self.base_local)
    }
}
