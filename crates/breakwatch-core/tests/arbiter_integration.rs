//! Integration tests for break arbitration.
//!
//! These tests drive full break cycles through the notification sink,
//! the way the daemon loop does.

use std::cell::RefCell;

use breakwatch_core::notify::{self, NotificationSink};
use breakwatch_core::{BreakArbiter, Event, Mode, Settings};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

#[derive(Default)]
struct RecordingSink {
    delivered: RefCell<Vec<(String, String)>>,
}

impl NotificationSink for RecordingSink {
    fn notify(&self, title: &str, body: &str) {
        self.delivered
            .borrow_mut()
            .push((title.to_string(), body.to_string()));
    }
}

fn start_of_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
}

#[test]
fn count_mode_break_cycle_notifies_twice() {
    let sink = RecordingSink::default();
    let t = start_of_day();
    let mut arbiter = BreakArbiter::new(Mode::Keystrokes, 3, 15, t);

    for i in 0..3 {
        if let Some(event) = arbiter.record_keystroke(t + Duration::seconds(i)) {
            notify::dispatch(&event, &sink);
        }
    }
    assert!(arbiter.on_break());

    let end = arbiter
        .finish_break(t + Duration::seconds(23))
        .expect("break in progress");
    notify::dispatch(&end, &sink);

    let delivered = sink.delivered.borrow();
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].0, "Take a break!");
    assert_eq!(delivered[1].0, "Break complete");
}

#[test]
fn time_mode_break_cycle_notifies_twice() {
    let sink = RecordingSink::default();
    let t = start_of_day();

    let mut settings = Settings::default();
    settings.breaks.mode = Mode::Time;
    settings.breaks.interval_minutes = 10;
    let mut arbiter = settings.arbiter(t);

    // Drive the 30-second tick cadence across the first interval.
    let mut fired_at = None;
    for i in 0..25 {
        let now = t + Duration::seconds(i * 30);
        if let Some(event) = arbiter.tick(now) {
            notify::dispatch(&event, &sink);
            fired_at = Some(now);
            break;
        }
    }
    let fired_at = fired_at.expect("time-based break fired");
    assert_eq!(fired_at, t + Duration::minutes(10));
    assert_eq!(
        arbiter.next_break_at(),
        Some(fired_at + Duration::minutes(10))
    );

    let end = arbiter
        .finish_break(fired_at + Duration::seconds(20))
        .expect("break in progress");
    notify::dispatch(&end, &sink);

    assert_eq!(sink.delivered.borrow().len(), 2);
}

#[test]
fn keystrokes_during_break_never_count() {
    let t = start_of_day();
    let mut arbiter = BreakArbiter::new(Mode::Keystrokes, 5, 15, t);
    for _ in 0..5 {
        arbiter.record_keystroke(t);
    }
    assert!(arbiter.on_break());

    for i in 0..100 {
        assert!(arbiter.record_keystroke(t + Duration::seconds(i)).is_none());
    }
    assert_eq!(arbiter.keystroke_count(), 0);
}

#[test]
fn snapshot_serializes_with_type_tag() {
    let t = start_of_day();
    let arbiter = BreakArbiter::new(Mode::Keystrokes, 3000, 15, t);
    let json = serde_json::to_value(arbiter.snapshot(t)).unwrap();
    assert_eq!(json["type"], "StateSnapshot");
    assert_eq!(json["mode"], "keystrokes");
    assert_eq!(json["keystroke_threshold"], 3000);
    assert_eq!(json["on_break"], false);
}

proptest! {
    /// Finishing each break as soon as it starts, `presses` key presses
    /// produce exactly `presses / threshold` breaks and leave
    /// `presses % threshold` on the counter.
    #[test]
    fn breaks_fire_exactly_at_threshold_multiples(
        threshold in 1u32..500,
        presses in 0u32..2000,
    ) {
        let t = start_of_day();
        let mut arbiter = BreakArbiter::new(Mode::Keystrokes, threshold, 15, t);

        let mut breaks = 0u32;
        for i in 0..presses {
            let now = t + Duration::seconds(i64::from(i));
            if let Some(Event::BreakStarted { .. }) = arbiter.record_keystroke(now) {
                breaks += 1;
                arbiter.finish_break(now + Duration::seconds(20));
            }
        }

        prop_assert_eq!(breaks, presses / threshold);
        prop_assert_eq!(arbiter.keystroke_count(), presses % threshold);
    }

    /// Ticks fire exactly once per elapsed interval no matter how often
    /// the clock is polled, provided breaks are finished promptly.
    #[test]
    fn tick_fires_once_per_interval(interval_min in 1u32..120) {
        let t = start_of_day();
        let mut arbiter = BreakArbiter::new(Mode::Time, 3000, interval_min, t);

        let horizon = Duration::minutes(i64::from(interval_min));
        let mut fires = 0u32;
        // Poll well past one interval at the 30-second cadence.
        let polls = i64::from(interval_min) * 2 + 1;
        for i in 0..=polls {
            let now = t + Duration::seconds(i * 30);
            if arbiter.tick(now).is_some() {
                fires += 1;
                arbiter.finish_break(now);
            }
            if now >= t + horizon + Duration::seconds(29) {
                break;
            }
        }

        prop_assert_eq!(fires, 1);
    }
}
