//! Notification dispatch.
//!
//! All user-facing notifications go through one sink interface.
//! Delivery is best-effort: sinks swallow their own failures. A full
//! break cycle produces exactly two notifications, start and end.

use crate::events::Event;

/// Where user-facing notifications go.
pub trait NotificationSink {
    fn notify(&self, title: &str, body: &str);
}

/// Forward an event to the sink, if it carries a notification.
pub fn dispatch(event: &Event, sink: &dyn NotificationSink) {
    match event {
        Event::BreakStarted { duration_secs, .. } => {
            sink.notify(
                "Take a break!",
                &format!("Stretch your hands for {duration_secs} seconds"),
            );
        }
        Event::BreakEnded { .. } => {
            sink.notify("Break complete", "Back to work!");
        }
        Event::ModeChanged { .. } | Event::StateSnapshot { .. } => {}
    }
}
