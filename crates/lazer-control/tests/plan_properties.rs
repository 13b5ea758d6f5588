//! 运动计划的性质测试

use lazer_control::{MotionPlan, PlanStep, step_count};
use lazer_protocol::{MovementStyle, Point};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn servo_point() -> impl Strategy<Value = Point> {
    (0..=180i32, 0..=180i32).prop_map(|(x, y)| Point::new(x, y))
}

fn any_style() -> impl Strategy<Value = MovementStyle> {
    prop::sample::select(MovementStyle::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_every_step_within_servo_range(
        current in servo_point(),
        target in servo_point(),
        style in any_style(),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let steps: Vec<PlanStep> = MotionPlan::new(current, target, style, &mut rng).collect();

        prop_assert!(!steps.is_empty());
        for step in steps {
            if let PlanStep::Move(p) = step {
                prop_assert!(p.is_within_servo_range(), "{} out of range", p);
            }
        }
    }

    #[test]
    fn prop_step_count_matches_distance(
        current in servo_point(),
        target in servo_point(),
        style in any_style(),
    ) {
        let mut rng = StdRng::seed_from_u64(0);
        let plan = MotionPlan::new(current, target, style, &mut rng);
        let expected = if style.is_pause() { 1 } else { step_count(current, target) };
        prop_assert_eq!(plan.count(), expected);
    }

    #[test]
    fn prop_straight_reaches_target(current in servo_point(), target in servo_point()) {
        let mut rng = StdRng::seed_from_u64(0);
        let last = MotionPlan::new(current, target, MovementStyle::Straight, &mut rng).last();
        prop_assert_eq!(last, Some(PlanStep::Move(target)));
    }

    #[test]
    fn prop_back_and_forth_returns_to_start(current in servo_point(), target in servo_point()) {
        let mut rng = StdRng::seed_from_u64(0);
        let last = MotionPlan::new(current, target, MovementStyle::BackAndForth, &mut rng).last();
        prop_assert_eq!(last, Some(PlanStep::Move(current)));
    }
}

#[test]
fn test_identical_points_yield_single_unchanged_step() {
    let p = Point::new(37, 121);
    for style in [
        MovementStyle::Straight,
        MovementStyle::Bounce,
        MovementStyle::BackAndForth,
        MovementStyle::Ease,
        MovementStyle::Spiral,
        MovementStyle::SmoothStep,
    ] {
        let mut rng = StdRng::seed_from_u64(0);
        let steps: Vec<PlanStep> = MotionPlan::new(p, p, style, &mut rng).collect();
        assert_eq!(steps, vec![PlanStep::Move(p)], "{style}");
    }

    // 带抖动的样式同样只有一步
    for style in MovementStyle::MOTION {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(MotionPlan::new(p, p, style, &mut rng).count(), 1, "{style}");
    }
}
