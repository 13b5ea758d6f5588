//! # Lazer Control
//!
//! 运动模式引擎
//!
//! 给定当前点、目标点与 [`MovementStyle`]，[`MotionPlan`] 按需生成一段插值路径；
//! `select` 模块负责随机挑选目标点和样式，`timing` 模块把舵机时间提示按速度缩放。
//!
//! 随机源由调用方注入（任何 `rand::Rng`），测试中使用 `StdRng::seed_from_u64` 固定序列。
//!
//! # 示例
//!
//! ```rust
//! use lazer_control::{MotionPlan, PlanStep};
//! use lazer_protocol::{MovementStyle, Point};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let plan = MotionPlan::new(Point::new(0, 0), Point::new(10, 0), MovementStyle::Straight, &mut rng);
//! let last = plan.last();
//! assert_eq!(last, Some(PlanStep::Move(Point::new(10, 0))));
//! ```

pub mod plan;
pub mod select;
pub mod timing;

pub use plan::{MotionPlan, PlanStep, STEP_SIZE, step_count};
pub use select::{random_style, random_target};
pub use timing::scale_delay;

pub use lazer_protocol::{MovementStyle, Point};
