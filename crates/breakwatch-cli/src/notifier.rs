//! Desktop notification sink.

use breakwatch_core::{NotificationSink, Settings};
use tracing::debug;

/// Best-effort notifications via the platform notification service.
pub struct DesktopNotifier {
    enabled: bool,
    sound: Option<String>,
}

impl DesktopNotifier {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            enabled: settings.notifications.enabled,
            sound: settings.notifications.sound.clone(),
        }
    }
}

impl NotificationSink for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        if !self.enabled {
            return;
        }
        let mut notification = notify_rust::Notification::new();
        notification.summary(title).body(body);
        if let Some(ref sound) = self.sound {
            notification.sound_name(sound);
        }
        // Delivery is best-effort; a failure is worth a log line, not more.
        if let Err(err) = notification.show() {
            debug!(%err, "notification delivery failed");
        }
    }
}
