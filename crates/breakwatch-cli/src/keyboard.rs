//! Global keyboard listener.
//!
//! `rdev::listen` parks an OS thread inside the platform event loop (a
//! Quartz event tap on macOS, which requires the Accessibility
//! permission). Key presses are handed off to the arbiter task over the
//! command channel; this thread never touches arbiter state.

use tokio::sync::mpsc;
use tracing::warn;

use crate::commands::run::ArbiterCommand;

pub fn spawn_listener(tx: mpsc::Sender<ArbiterCommand>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("breakwatch-keys".to_string())
        .spawn(move || {
            let key_tx = tx.clone();
            let result = rdev::listen(move |event| {
                if let rdev::EventType::KeyPress(_) = event.event_type {
                    // Drop on backpressure; the event tap must not block.
                    let _ = key_tx.try_send(ArbiterCommand::Keystroke);
                }
            });
            if let Err(err) = result {
                warn!(?err, "failed to install global key listener");
                let _ = tx.blocking_send(ArbiterCommand::ListenerFailed);
            }
        })?;
    Ok(())
}
