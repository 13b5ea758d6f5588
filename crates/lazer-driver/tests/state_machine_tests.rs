//! 按键驱动的状态机、空闲超时与周计划

mod common;

use common::*;
use lazer_driver::Clock;
use lazer_io::ServoSink;
use lazer_protocol::{
    ButtonEvent, ButtonId, Configuration, OperatingState, ScheduleEntry, Weekday, WeeklySchedule,
};
use lazer_tools::MemoryStore;
use std::time::Duration;

#[test]
fn test_right_short_press_cycles_speeds() {
    let h = harness();
    let ctrl = &h.controller;
    assert_eq!(ctrl.state(), OperatingState::Off);

    let expected = [
        (OperatingState::Slow, 0.25),
        (OperatingState::Medium, 0.5),
        (OperatingState::Fast, 1.0),
    ];
    for (state, speed) in expected {
        press(ctrl, ButtonId::Right, short_release());
        assert_eq!(ctrl.state(), state);
        assert_eq!(ctrl.snapshot().speed, speed);
        assert_eq!(h.sink.pins.level(ctrl.config().duty_pin), Some(true));
    }

    press(ctrl, ButtonId::Right, short_release());
    assert_eq!(ctrl.state(), OperatingState::Off);
    // Off 关闭输出引脚
    assert_eq!(h.sink.pins.level(ctrl.config().duty_pin), Some(false));
}

#[test]
fn test_speed_survives_switching_off() {
    let h = harness();
    let ctrl = &h.controller;
    for _ in 0..3 {
        press(ctrl, ButtonId::Right, short_release());
    }
    press(ctrl, ButtonId::Left, short_release());
    assert_eq!(ctrl.state(), OperatingState::Off);
    assert_eq!(ctrl.snapshot().speed, 1.0);
}

#[test]
fn test_right_long_press_forces_off_without_reset() {
    let h = harness();
    let ctrl = &h.controller;
    press(ctrl, ButtonId::Right, short_release());
    h.sink.set_xy(1, 0, 10, 20).unwrap();

    press(ctrl, ButtonId::Right, long_release());
    assert_eq!(ctrl.state(), OperatingState::Off);
    // 急停不移动舵机，也不改变输出引脚
    assert_eq!(h.sink.get_xy(1, 0).x, 10);
    assert_eq!(h.sink.get_xy(1, 0).y, 20);
    assert_eq!(h.sink.pins.level(ctrl.config().duty_pin), Some(true));
}

#[test]
fn test_long_press_threshold_is_strict() {
    let h = harness();
    let ctrl = &h.controller;
    press(ctrl, ButtonId::Right, short_release());

    // 恰好等于阈值仍是短按
    press(ctrl, ButtonId::Right, ButtonEvent::release(Duration::from_secs(2)));
    assert_eq!(ctrl.state(), OperatingState::Medium);
}

#[test]
fn test_left_short_press_switches_off_and_centers() {
    let h = harness();
    let ctrl = &h.controller;
    press(ctrl, ButtonId::Right, short_release());
    h.sink.set_xy(1, 0, 10, 170).unwrap();

    press(ctrl, ButtonId::Left, short_release());
    assert_eq!(ctrl.state(), OperatingState::Off);
    let p = h.sink.get_xy(1, 0);
    assert_eq!((p.x, p.y), (90, 90));
    assert_eq!(h.sink.pins.level(ctrl.config().duty_pin), Some(false));
}

#[test]
fn test_press_edges_are_ignored() {
    let h = harness();
    let ctrl = &h.controller;
    press(ctrl, ButtonId::Right, ButtonEvent::press(Duration::from_secs(5)));
    press(ctrl, ButtonId::Left, ButtonEvent::press(Duration::from_secs(5)));
    assert_eq!(ctrl.state(), OperatingState::Off);
    assert!(!ctrl.is_configuring());
}

#[test]
fn test_right_press_refreshes_activity() {
    let h = harness();
    let ctrl = &h.controller;
    h.clock.advance(Duration::from_secs(90));
    press(ctrl, ButtonId::Right, short_release());
    assert_eq!(ctrl.snapshot().active_since, h.clock.instant());
}

#[test]
fn test_idle_timeout_switches_off() {
    let h = harness();
    let ctrl = &h.controller;
    for _ in 0..3 {
        press(ctrl, ButtonId::Right, short_release());
    }
    assert_eq!(ctrl.state(), OperatingState::Fast);
    let t0 = ctrl.snapshot().active_since;

    assert!(!ctrl.check_idle(t0 + Duration::from_secs(29 * 60)));
    assert_eq!(ctrl.state(), OperatingState::Fast);

    assert!(ctrl.check_idle(t0 + Duration::from_secs(31 * 60)));
    assert_eq!(ctrl.state(), OperatingState::Off);
    assert_eq!(h.sink.pins.level(ctrl.config().duty_pin), Some(false));
}

#[test]
fn test_idle_timeout_ignores_stopped_states() {
    let h = harness();
    let t0 = h.controller.snapshot().active_since;
    assert!(!h.controller.check_idle(t0 + Duration::from_secs(3600)));
    assert_eq!(h.controller.state(), OperatingState::Off);
}

fn friday_schedule() -> WeeklySchedule {
    let mut schedule = WeeklySchedule::new();
    schedule.push(
        Weekday::Friday,
        ScheduleEntry::new("08:30", Duration::from_secs(30 * 60), OperatingState::Slow),
    );
    schedule.push(
        Weekday::Friday,
        ScheduleEntry::new("08:40", Duration::from_secs(60 * 60), OperatingState::Fast),
    );
    schedule
}

#[test]
fn test_schedule_first_match_wins() {
    let store = MemoryStore::with_config(Configuration {
        schedule: friday_schedule(),
        ..Default::default()
    });
    let h = harness_with(store, fast_config());
    let ctrl = &h.controller;

    let instant = h.clock.instant() + Duration::from_secs(5);
    assert_eq!(
        ctrl.check_schedule(friday_at(8, 45), instant),
        Some(OperatingState::Slow)
    );
    assert_eq!(ctrl.state(), OperatingState::Slow);
    assert_eq!(ctrl.snapshot().active_since, instant);
}

#[test]
fn test_schedule_window_end_is_exclusive() {
    let store = MemoryStore::with_config(Configuration {
        schedule: friday_schedule(),
        ..Default::default()
    });
    let h = harness_with(store, fast_config());
    let ctrl = &h.controller;

    // 08:30 的记录在 09:00 结束，由第二条接管
    assert_eq!(
        ctrl.check_schedule(friday_at(9, 0), h.clock.instant()),
        Some(OperatingState::Fast)
    );
    assert_eq!(ctrl.check_schedule(friday_at(9, 40), h.clock.instant()), None);
    assert_eq!(ctrl.state(), OperatingState::Fast);
}

#[test]
fn test_schedule_can_switch_off() {
    let mut schedule = WeeklySchedule::new();
    schedule.push(
        Weekday::Friday,
        ScheduleEntry::new("22:00", Duration::from_secs(3600), OperatingState::Off),
    );
    let h = harness_with(
        MemoryStore::with_config(Configuration {
            schedule,
            ..Default::default()
        }),
        fast_config(),
    );
    let ctrl = &h.controller;
    press(ctrl, ButtonId::Right, short_release());

    assert_eq!(
        ctrl.check_schedule(friday_at(22, 10), h.clock.instant()),
        Some(OperatingState::Off)
    );
    assert_eq!(ctrl.state(), OperatingState::Off);
}

#[test]
fn test_set_schedule_persists() {
    let h = harness();
    h.controller.set_schedule(friday_schedule()).unwrap();

    assert_eq!(h.controller.schedule(), friday_schedule());
    let saved = h.store.saved().unwrap();
    assert_eq!(saved.schedule, friday_schedule());
    assert_eq!(h.store.save_count(), 1);
}

#[test]
fn test_set_schedule_applies_even_if_persisting_fails() {
    let h = harness();
    h.store.set_fail(true);
    assert!(h.controller.set_schedule(friday_schedule()).is_err());
    assert_eq!(h.controller.schedule(), friday_schedule());
}
