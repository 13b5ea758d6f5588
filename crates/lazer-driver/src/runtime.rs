//! 控制器运行时状态
//!
//! `state`/`speed`/`active_since` 作为一个快照整体原子替换（ArcSwap），
//! 读者总能看到一致的组合；`configuring` 是独立的原子闸门，
//! 用 compare-and-swap 保证同一时刻只有一次校准。

use arc_swap::ArcSwap;
use lazer_protocol::OperatingState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// 运行时快照
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuntimeSnapshot {
    pub state: OperatingState,
    /// 速度系数（0..1）
    pub speed: f64,
    /// 最近一次激活时间（按键或周计划）
    pub active_since: Instant,
}

#[derive(Debug)]
pub struct Runtime {
    snapshot: ArcSwap<RuntimeSnapshot>,
    configuring: AtomicBool,
}

impl Runtime {
    pub fn new(now: Instant) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(RuntimeSnapshot {
                state: OperatingState::Off,
                speed: 0.0,
                active_since: now,
            }),
            configuring: AtomicBool::new(false),
        }
    }

    pub fn load(&self) -> RuntimeSnapshot {
        **self.snapshot.load()
    }

    pub fn state(&self) -> OperatingState {
        self.snapshot.load().state
    }

    /// 原子地修改快照，返回修改前的值
    pub fn update<F>(&self, f: F) -> RuntimeSnapshot
    where
        F: Fn(&mut RuntimeSnapshot),
    {
        let previous = self.snapshot.rcu(|current| {
            let mut next = **current;
            f(&mut next);
            next
        });
        *previous
    }

    /// 尝试进入校准；已在校准中时返回 `false`
    pub fn try_begin_configuring(&self) -> bool {
        self.configuring
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn end_configuring(&self) {
        self.configuring.store(false, Ordering::Release);
    }

    pub fn is_configuring(&self) -> bool {
        self.configuring.load(Ordering::Acquire)
    }
}
