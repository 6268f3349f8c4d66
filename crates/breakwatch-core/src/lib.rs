//! # Breakwatch Core Library
//!
//! Core logic for breakwatch, a keyboard-aware micro-break reminder.
//! The daemon binary is a thin shell over this library: it feeds OS
//! inputs (key presses, clock ticks) into the arbiter and forwards the
//! resulting events to a notification sink.
//!
//! ## Architecture
//!
//! - **Break Arbiter**: a wall-clock-based state machine that decides
//!   when breaks start and end. It has no internal threads; the caller
//!   drives it with `record_keystroke()` and periodic `tick()` calls.
//! - **Storage**: TOML-based settings persisted under the user config
//!   directory.
//! - **Notify**: a single sink interface for user-facing notifications,
//!   with best-effort delivery semantics.
//!
//! ## Key Components
//!
//! - [`BreakArbiter`]: the trigger-arbitration state machine
//! - [`Settings`]: persisted user preferences
//! - [`Event`]: externally visible state changes

pub mod arbiter;
pub mod error;
pub mod events;
pub mod notify;
pub mod storage;

pub use arbiter::{BreakArbiter, Mode};
pub use error::{ConfigError, ValidationError};
pub use events::Event;
pub use notify::NotificationSink;
pub use storage::Settings;
