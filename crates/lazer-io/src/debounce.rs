//! 按键去抖
//!
//! 按键为上拉输入：按下产生下降沿，松开产生上升沿。去抖状态机：
//!
//! ```text
//! Idle ──(建立基准)──> Armed ──(首个有效事件，丢弃)──> Debounced ──> 正常输出
//! ```
//!
//! - 与当前电平相同的重复跳变被丢弃（只用于建立时间基准）
//! - 只在上升沿测量间隔，间隔低于 [`DEBOUNCE_FLOOR`] 的跳变被抑制（下降沿因此总被抑制）
//! - 启动后第一个有效事件没有可信的基准，被丢弃

use crossbeam_channel::{Receiver, Sender};
use lazer_protocol::{ButtonEvent, ButtonId, Edge};
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// 去抖下限
pub const DEBOUNCE_FLOOR: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// 尚无时间基准
    Idle,
    /// 已有基准，等待首个有效事件
    Armed,
    /// 正常输出
    Debounced,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    state: DebounceState,
    level: Edge,
    last_edge: Option<Instant>,
    floor: Duration,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_FLOOR)
    }
}

impl Debouncer {
    pub fn new(floor: Duration) -> Self {
        Self {
            state: DebounceState::Idle,
            // 上拉输入静止时为高电平，初始视作已处于 "按下前" 的低电平基准
            level: Edge::Falling,
            last_edge: None,
            floor,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// 处理一次原始跳变，返回应当输出的事件
    pub fn on_edge(&mut self, edge: Edge, at: Instant) -> Option<ButtonEvent> {
        if edge == self.level {
            if self.last_edge.is_none() {
                self.last_edge = Some(at);
                self.arm();
            }
            return None;
        }

        let hold = match edge {
            Edge::Rising => self
                .last_edge
                .map_or(Duration::MAX, |t| at.saturating_duration_since(t)),
            Edge::Falling => Duration::ZERO,
        };
        self.level = edge;
        self.last_edge = Some(at);

        if hold < self.floor {
            self.arm();
            return None;
        }

        match self.state {
            DebounceState::Idle | DebounceState::Armed => {
                self.state = DebounceState::Debounced;
                None
            },
            DebounceState::Debounced => Some(ButtonEvent { edge, hold }),
        }
    }

    fn arm(&mut self) {
        if self.state == DebounceState::Idle {
            self.state = DebounceState::Armed;
        }
    }
}

/// 一个按键的输入端：接收原始跳变，把去抖后的事件送入通道
pub struct ButtonInput {
    id: ButtonId,
    debouncer: Mutex<Debouncer>,
    tx: Sender<ButtonEvent>,
}

/// 创建按键输入端与对应的事件接收端
pub fn button_channel(id: ButtonId) -> (ButtonInput, Receiver<ButtonEvent>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    let input = ButtonInput {
        id,
        debouncer: Mutex::new(Debouncer::default()),
        tx,
    };
    (input, rx)
}

impl ButtonInput {
    pub fn id(&self) -> ButtonId {
        self.id
    }

    /// GPIO 边沿回调
    pub fn edge(&self, edge: Edge, at: Instant) {
        let event = self.debouncer.lock().on_edge(edge, at);
        let Some(event) = event else {
            trace!("{} button: {:?} edge suppressed", self.id, edge);
            return;
        };
        if self.tx.send(event).is_err() {
            debug!("{} button: receiver dropped, event discarded", self.id);
        }
    }

    /// 模拟一次按住 `hold` 后松开
    pub fn press(&self, hold: Duration) {
        let pressed_at = Instant::now();
        self.edge(Edge::Falling, pressed_at);
        self.edge(Edge::Rising, pressed_at + hold);
    }
}
