//! 插值路径
//!
//! 步数 `steps = max(1, ceil(distance / STEP_SIZE))`，第 `i` 步（`1..=steps`）的参数
//! `t = i / steps`。各样式把 `t` 映射为直线插值上的偏移或重映射：
//!
//! | 样式 | 映射 |
//! |------|------|
//! | Straight | 线性 |
//! | Curve | y 叠加 `10·sin(πt)` |
//! | Bounce | `t + 0.1·sin(3πt)` |
//! | BackAndForth | 三角波：前半程去，后半程回 |
//! | Jagged | x 加 `j`、y 减 `j`，`j ∈ [-2, 2]` |
//! | Ease | `-0.5·(cos(πt) - 1)` |
//! | ZigZag | y 叠加 `trunc(5·sin(10πt))` |
//! | Spiral | 半径 `10(1-t)`、角度 `4πt` 的旋转偏移 |
//! | Random | 每轴独立抖动 `[-3, 3]` |
//! | SmoothStep | `t²(3 - 2t)` |
//! | Wave | y 叠加 `8·sin(4πt)` |
//! | ShortPause / LongPause | 不移动，单次停顿 1–5s / 5–34s |
//!
//! 坐标按整数截断，输出前截断到 `[0, 180]`。

use lazer_protocol::{MovementStyle, Point};
use rand::Rng;
use std::f64::consts::PI;
use std::time::Duration;

/// 每步的最大角度距离
pub const STEP_SIZE: f64 = 2.0;

/// 计划中的一步
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStep {
    /// 移动到该点（已截断到舵机范围）
    Move(Point),
    /// 停顿，不移动
    Pause(Duration),
}

/// 两点之间的插值步数（至少 1）
pub fn step_count(current: Point, target: Point) -> usize {
    let steps = (current.distance(target) / STEP_SIZE).ceil() as usize;
    steps.max(1)
}

/// 一段运动的惰性计划
///
/// 实现 `Iterator<Item = PlanStep>`，逐步产出；调用方可在任意两步之间停止，
/// 也可以 [`reset`](MotionPlan::reset) 后重新开始。
pub struct MotionPlan<R: Rng> {
    current: Point,
    target: Point,
    style: MovementStyle,
    steps: usize,
    index: usize,
    pause: Option<Duration>,
    rng: R,
}

impl<R: Rng> MotionPlan<R> {
    /// 创建运动计划
    ///
    /// # 参数
    ///
    /// - `current`: 起点（一般是舵机报告的当前位置）
    /// - `target`: 终点
    /// - `style`: 插值样式
    /// - `rng`: 抖动与停顿时长的随机源
    pub fn new(current: Point, target: Point, style: MovementStyle, mut rng: R) -> Self {
        let pause = match style {
            MovementStyle::ShortPause => Some(Duration::from_secs(rng.gen_range(1..=5))),
            MovementStyle::LongPause => Some(Duration::from_secs(rng.gen_range(5..=34))),
            _ => None,
        };
        let steps = if pause.is_some() {
            1
        } else {
            step_count(current, target)
        };

        Self {
            current,
            target,
            style,
            steps,
            index: 0,
            pause,
            rng,
        }
    }

    pub fn style(&self) -> MovementStyle {
        self.style
    }

    pub fn target(&self) -> Point {
        self.target
    }

    /// 总步数
    pub fn total_steps(&self) -> usize {
        self.steps
    }

    /// 已产出的步数
    pub fn completed_steps(&self) -> usize {
        self.index
    }

    /// 当前进度（0.0 到 1.0）
    pub fn progress(&self) -> f64 {
        self.index as f64 / self.steps as f64
    }

    /// 重置到起点
    pub fn reset(&mut self) {
        self.index = 0;
    }

    fn point_at(&mut self, t: f64) -> Point {
        let (cx, cy) = (f64::from(self.current.x), f64::from(self.current.y));
        let dx = f64::from(self.target.x - self.current.x);
        let dy = f64::from(self.target.y - self.current.y);
        let lerp = |s: f64| (trunc(cx + dx * s), trunc(cy + dy * s));

        let (x, y) = match self.style {
            MovementStyle::Curve => (
                trunc(cx + dx * t),
                trunc(cy + dy * t + 10.0 * (t * PI).sin()),
            ),
            MovementStyle::Bounce => lerp(t + 0.1 * (3.0 * PI * t).sin()),
            MovementStyle::BackAndForth => {
                let bt = if t < 0.5 { t * 2.0 } else { 1.0 - (t - 0.5) * 2.0 };
                lerp(bt)
            },
            MovementStyle::Jagged => {
                let jag = self.rng.gen_range(-2..=2);
                let (x, y) = lerp(t);
                (x + jag, y - jag)
            },
            MovementStyle::Ease => lerp(-0.5 * ((PI * t).cos() - 1.0)),
            MovementStyle::ZigZag => {
                let offset = trunc(5.0 * (10.0 * t * PI).sin());
                let (x, y) = lerp(t);
                (x, y + offset)
            },
            MovementStyle::Spiral => {
                let radius = 10.0 * (1.0 - t);
                let angle = 4.0 * PI * t;
                (
                    trunc(cx + dx * t + radius * angle.cos()),
                    trunc(cy + dy * t + radius * angle.sin()),
                )
            },
            MovementStyle::Random => {
                let (x, y) = lerp(t);
                (x + self.rng.gen_range(-3..=3), y + self.rng.gen_range(-3..=3))
            },
            MovementStyle::SmoothStep => lerp(t * t * (3.0 - 2.0 * t)),
            MovementStyle::Wave => (
                trunc(cx + dx * t),
                trunc(cy + dy * t + 8.0 * (4.0 * t * PI).sin()),
            ),
            MovementStyle::Straight | MovementStyle::ShortPause | MovementStyle::LongPause => {
                lerp(t)
            },
        };

        Point::new(x, y).clamped()
    }
}

/// 向零截断
fn trunc(v: f64) -> i32 {
    v as i32
}

impl<R: Rng> Iterator for MotionPlan<R> {
    type Item = PlanStep;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.steps {
            return None;
        }
        self.index += 1;

        if let Some(pause) = self.pause {
            return Some(PlanStep::Pause(pause));
        }

        let t = self.index as f64 / self.steps as f64;
        Some(PlanStep::Move(self.point_at(t)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.steps - self.index;
        (remaining, Some(remaining))
    }
}

impl<R: Rng> ExactSizeIterator for MotionPlan<R> {}
