//! Break arbitration engine.
//!
//! The arbiter is a wall-clock-based state machine. It does not use
//! internal threads or timers - the caller feeds it keystrokes and
//! periodic `tick()` calls, and schedules the end-of-break callback
//! when a break starts.
//!
//! ## Break cycle
//!
//! ```text
//! counting/waiting -> on break -> counting/waiting
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut arbiter = BreakArbiter::new(Mode::Keystrokes, 3000, 15, Utc::now());
//! // From the key event source:
//! arbiter.record_keystroke(Utc::now()); // Returns Some(Event) when a break starts
//! // Every TICK_PERIOD_SECS:
//! arbiter.tick(Utc::now());
//! // BREAK_DURATION_SECS after a break starts:
//! arbiter.finish_break(Utc::now());
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;

/// How breaks are triggered. Exactly one mode is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Break after a fixed number of key presses.
    Keystrokes,
    /// Break every fixed wall-clock interval.
    Time,
}

/// Length of a single break.
pub const BREAK_DURATION_SECS: u64 = 20;

/// Cadence at which callers should drive [`BreakArbiter::tick`].
pub const TICK_PERIOD_SECS: u64 = 30;

/// Decides when breaks start and end.
///
/// Owns the running keystroke count, the next scheduled break time and
/// the on-break flag. The count is only meaningful in `Keystrokes` mode,
/// the scheduled time only in `Time` mode; being on break suppresses all
/// triggering regardless of mode. All mutating calls must come from a
/// single owner - the arbiter never blocks and never talks to the OS.
#[derive(Debug, Clone)]
pub struct BreakArbiter {
    mode: Mode,
    keystroke_threshold: u32,
    interval_minutes: u32,
    keystroke_count: u32,
    next_break_at: Option<DateTime<Utc>>,
    on_break: bool,
}

impl BreakArbiter {
    /// Create an arbiter in the given mode.
    ///
    /// In `Time` mode the first break is scheduled `interval_minutes`
    /// from `now`. Threshold and interval must already be validated;
    /// the arbiter does not reject them.
    pub fn new(
        mode: Mode,
        keystroke_threshold: u32,
        interval_minutes: u32,
        now: DateTime<Utc>,
    ) -> Self {
        let next_break_at = match mode {
            Mode::Time => Some(now + Duration::minutes(i64::from(interval_minutes))),
            Mode::Keystrokes => None,
        };
        Self {
            mode,
            keystroke_threshold,
            interval_minutes,
            keystroke_count: 0,
            next_break_at,
            on_break: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn keystroke_count(&self) -> u32 {
        self.keystroke_count
    }

    pub fn keystroke_threshold(&self) -> u32 {
        self.keystroke_threshold
    }

    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    pub fn next_break_at(&self) -> Option<DateTime<Utc>> {
        self.next_break_at
    }

    pub fn on_break(&self) -> bool {
        self.on_break
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            keystroke_count: self.keystroke_count,
            keystroke_threshold: self.keystroke_threshold,
            interval_minutes: self.interval_minutes,
            next_break_at: self.next_break_at,
            on_break: self.on_break,
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Record one key press from the global listener.
    ///
    /// Counts only in `Keystrokes` mode while no break is in progress.
    /// Returns `Some(Event::BreakStarted)` when the count reaches the
    /// threshold; the count resets to zero at that point.
    pub fn record_keystroke(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.mode != Mode::Keystrokes || self.on_break {
            return None;
        }
        self.keystroke_count += 1;
        if self.keystroke_count >= self.keystroke_threshold {
            self.keystroke_count = 0;
            return Some(self.begin_break(now));
        }
        None
    }

    /// Call periodically. Returns `Some(Event::BreakStarted)` when a
    /// time-based break comes due, after which the next break is
    /// scheduled `interval_minutes` from `now`. Repeated calls with the
    /// same `now` fire at most once.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.mode != Mode::Time || self.on_break {
            return None;
        }
        let due = self.next_break_at?;
        if now < due {
            return None;
        }
        let event = self.begin_break(now);
        self.next_break_at = Some(now + self.interval());
        Some(event)
    }

    /// End the break in progress (invoked by the caller's scheduled
    /// end-of-break callback). No-op when not on break.
    pub fn finish_break(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if !self.on_break {
            return None;
        }
        self.on_break = false;
        Some(Event::BreakEnded { at: now })
    }

    /// Switch mode, clearing the state that belongs to the other mode.
    pub fn set_mode(&mut self, mode: Mode, now: DateTime<Utc>) -> Event {
        self.mode = mode;
        self.keystroke_count = 0;
        self.next_break_at = match mode {
            Mode::Time => Some(now + self.interval()),
            Mode::Keystrokes => None,
        };
        Event::ModeChanged { mode, at: now }
    }

    /// Update the keystroke threshold. The running count is kept; a
    /// press that brings it to the new threshold fires immediately.
    pub fn set_threshold(&mut self, threshold: u32) {
        self.keystroke_threshold = threshold;
    }

    /// Update the break interval. In `Time` mode a changed interval
    /// reschedules the next break relative to `now`.
    pub fn set_interval_minutes(&mut self, minutes: u32, now: DateTime<Utc>) {
        if minutes == self.interval_minutes {
            return;
        }
        self.interval_minutes = minutes;
        if self.mode == Mode::Time {
            self.next_break_at = Some(now + self.interval());
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn interval(&self) -> Duration {
        Duration::minutes(i64::from(self.interval_minutes))
    }

    fn begin_break(&mut self, now: DateTime<Utc>) -> Event {
        self.on_break = true;
        Event::BreakStarted {
            trigger: self.mode,
            duration_secs: BREAK_DURATION_SECS,
            at: now,
        }
    }
}
