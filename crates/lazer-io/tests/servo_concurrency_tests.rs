//! 舵机组并发访问测试

use lazer_io::{
    IoDeviceError, IoDeviceErrorKind, IoError, MemoryPins, MemoryPwm, ServoBank, ServoSink,
    angle_to_pulse,
};
use lazer_protocol::Point;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_concurrent_set_xy_keeps_channels_consistent() {
    let pwm = Arc::new(MemoryPwm::new());
    let bank = Arc::new(
        ServoBank::new(Arc::clone(&pwm), MemoryPins::new()).with_settle(Duration::ZERO),
    );

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let bank = Arc::clone(&bank);
            thread::spawn(move || {
                for i in 0..50 {
                    let angle = (worker * 40 + i) % 181;
                    bank.set_xy(1, 0, angle, 180 - angle).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // 每个通道最后一次写入与报告的角度一致
    let Point { x, y } = bank.get_xy(1, 0);
    assert_eq!(pwm.last_write(1).unwrap().off, angle_to_pulse(x) as u16);
    assert_eq!(pwm.last_write(0).unwrap().off, angle_to_pulse(y) as u16);
    assert_eq!(pwm.writes().len(), 4 * 50 * 2);
}

#[test]
fn test_dyn_sink_through_arc() {
    let sink: Arc<dyn ServoSink> = Arc::new(
        ServoBank::new(MemoryPwm::new(), MemoryPins::new()).with_settle(Duration::ZERO),
    );
    sink.set_xy(1, 0, 45, 135).unwrap();
    assert_eq!(sink.get_xy(1, 0), Point::new(45, 135));
    sink.reset().unwrap();
    assert_eq!(sink.get_xy(1, 0), Point::neutral());
}

/// 记录每次 `set_angle` 所在线程的舵机
#[derive(Default)]
struct ThreadRecorder {
    calls: std::sync::Mutex<Vec<(i32, thread::ThreadId)>>,
    failing_channel: Option<i32>,
}

impl ServoSink for ThreadRecorder {
    fn set_angle(&self, channel: i32, _angle: i32) -> Result<Duration, IoError> {
        self.calls
            .lock()
            .unwrap()
            .push((channel, thread::current().id()));
        if self.failing_channel == Some(channel) {
            return Err(IoDeviceError::new(IoDeviceErrorKind::Unknown, "channel fault").into());
        }
        Ok(Duration::from_millis(channel as u64 + 1))
    }

    fn get_xy(&self, _channel_x: i32, _channel_y: i32) -> Point {
        Point::neutral()
    }

    fn reset(&self) -> Result<(), IoError> {
        Ok(())
    }

    fn set_digital_pin(&self, _pin: u32, _active: bool) -> Result<(), IoError> {
        Ok(())
    }

    fn close(&self) -> Result<(), IoError> {
        Ok(())
    }
}

#[test]
fn test_default_set_xy_runs_on_calling_thread() {
    let sink = ThreadRecorder::default();
    for _ in 0..100 {
        let hint = sink.set_xy(1, 0, 45, 135).unwrap();
        assert_eq!(hint, Duration::from_millis(3));
    }

    let me = thread::current().id();
    let calls = sink.calls.lock().unwrap();
    assert_eq!(calls.len(), 200);
    assert!(calls.iter().all(|(_, id)| *id == me));
    assert_eq!(calls[0].0, 1);
    assert_eq!(calls[1].0, 0);
}

#[test]
fn test_default_set_xy_propagates_channel_error() {
    let sink = ThreadRecorder {
        failing_channel: Some(1),
        ..Default::default()
    };
    assert!(sink.set_xy(1, 0, 45, 135).is_err());
    // X 失败后不再下发 Y
    assert_eq!(sink.calls.lock().unwrap().len(), 1);

    let sink = ThreadRecorder {
        failing_channel: Some(0),
        ..Default::default()
    };
    assert!(sink.set_xy(1, 0, 45, 135).is_err());
}
