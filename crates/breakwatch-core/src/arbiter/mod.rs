mod engine;

pub use engine::{BreakArbiter, Mode, BREAK_DURATION_SECS, TICK_PERIOD_SECS};
