use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::arbiter::Mode;

/// Every externally visible state change produces an Event.
/// The daemon loop turns them into notifications; `status` prints
/// snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    BreakStarted {
        trigger: Mode,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    BreakEnded {
        at: DateTime<Utc>,
    },
    ModeChanged {
        mode: Mode,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: Mode,
        keystroke_count: u32,
        keystroke_threshold: u32,
        interval_minutes: u32,
        next_break_at: Option<DateTime<Utc>>,
        on_break: bool,
        at: DateTime<Utc>,
    },
}
