//! 按键事件

use std::fmt;
use std::time::Duration;

/// 物理按键编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonId {
    Left,
    Right,
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ButtonId::Left => f.write_str("left"),
            ButtonId::Right => f.write_str("right"),
        }
    }
}

/// 电平跳变方向
///
/// 按键为上拉输入（低电平有效）：按下是下降沿，松开是上升沿。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Rising,
    Falling,
}

/// 去抖后的按键事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub edge: Edge,
    /// 与上一次跳变的间隔（松开事件即按住时长）
    pub hold: Duration,
}

impl ButtonEvent {
    pub fn release(hold: Duration) -> Self {
        Self {
            edge: Edge::Rising,
            hold,
        }
    }

    pub fn press(hold: Duration) -> Self {
        Self {
            edge: Edge::Falling,
            hold,
        }
    }

    /// 松开事件（上升沿）
    pub fn is_release(&self) -> bool {
        self.edge == Edge::Rising
    }
}
