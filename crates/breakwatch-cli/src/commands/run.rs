//! Foreground daemon loop.
//!
//! One task owns the arbiter and drains a single command channel, so
//! keystrokes, clock ticks, break ends and settings changes are
//! serialized without locks. The key listener and the ticker only
//! produce commands; notifications are fire-and-forget.

use std::path::Path;
use std::time::{Duration, SystemTime};

use breakwatch_core::arbiter::TICK_PERIOD_SECS;
use breakwatch_core::notify::{self, NotificationSink};
use breakwatch_core::{BreakArbiter, Event, Settings};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::keyboard;
use crate::notifier::DesktopNotifier;

/// Commands accepted by the arbiter task. Everything that mutates
/// arbiter state arrives as one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterCommand {
    Keystroke,
    Tick,
    FinishBreak,
    /// The global key listener could not be installed.
    ListenerFailed,
}

const COMMAND_BUFFER: usize = 1024;

pub fn run(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load_or_default();
    init_tracing(verbose || settings.debug_logging);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_loop(settings))
}

async fn run_loop(mut settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut arbiter = settings.arbiter(Utc::now());
    let mut notifier = DesktopNotifier::from_settings(&settings);

    let (tx, mut rx) = mpsc::channel::<ArbiterCommand>(COMMAND_BUFFER);
    keyboard::spawn_listener(tx.clone())?;
    spawn_ticker(tx.clone());

    let settings_path = Settings::path()?;
    let mut settings_stamp = modified_at(&settings_path);

    info!(
        mode = ?settings.breaks.mode,
        threshold = settings.breaks.keystroke_threshold,
        interval_minutes = settings.breaks.interval_minutes,
        "breakwatch running"
    );

    loop {
        let command = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
            command = rx.recv() => match command {
                Some(command) => command,
                None => return Ok(()),
            },
        };

        let now = Utc::now();
        let event = match command {
            ArbiterCommand::Keystroke => arbiter.record_keystroke(now),
            ArbiterCommand::Tick => {
                // Menu-equivalent user actions land in the settings file
                // (e.g. via `breakwatch config set`); fold them into the
                // serialized loop before the time check.
                if let Some(stamp) = modified_at(&settings_path) {
                    if settings_stamp != Some(stamp) {
                        settings_stamp = Some(stamp);
                        if let Some(fresh) = reload_settings(&settings) {
                            sync_arbiter(&mut arbiter, &settings, &fresh, now);
                            notifier = DesktopNotifier::from_settings(&fresh);
                            settings = fresh;
                        }
                    }
                }
                arbiter.tick(now)
            }
            ArbiterCommand::FinishBreak => arbiter.finish_break(now),
            ArbiterCommand::ListenerFailed => {
                handle_listener_failure(&mut settings, &notifier);
                None
            }
        };

        if let Some(event) = event {
            handle_event(&event, &notifier, &tx);
        }
    }
}

fn handle_event(event: &Event, notifier: &DesktopNotifier, tx: &mpsc::Sender<ArbiterCommand>) {
    debug!(?event, "arbiter event");
    notify::dispatch(event, notifier);

    if let Event::BreakStarted { duration_secs, .. } = event {
        let tx = tx.clone();
        let duration = Duration::from_secs(*duration_secs);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send(ArbiterCommand::FinishBreak).await;
        });
    }
}

fn spawn_ticker(tx: mpsc::Sender<ArbiterCommand>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(TICK_PERIOD_SECS));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(ArbiterCommand::Tick).await.is_err() {
                return;
            }
        }
    });
}

fn reload_settings(current: &Settings) -> Option<Settings> {
    match Settings::load() {
        Ok(fresh) if fresh.validate().is_ok() => (fresh != *current).then_some(fresh),
        Ok(_) => {
            warn!("ignoring settings change with invalid values");
            None
        }
        Err(err) => {
            warn!(%err, "ignoring unreadable settings change");
            None
        }
    }
}

fn sync_arbiter(arbiter: &mut BreakArbiter, old: &Settings, new: &Settings, now: DateTime<Utc>) {
    if new.breaks.mode != old.breaks.mode {
        let event = arbiter.set_mode(new.breaks.mode, now);
        debug!(?event, "mode changed");
    }
    if new.breaks.keystroke_threshold != old.breaks.keystroke_threshold {
        arbiter.set_threshold(new.breaks.keystroke_threshold);
    }
    if new.breaks.interval_minutes != old.breaks.interval_minutes {
        arbiter.set_interval_minutes(new.breaks.interval_minutes, now);
    }
}

fn handle_listener_failure(settings: &mut Settings, notifier: &DesktopNotifier) {
    warn!("global key listener unavailable; count-based breaks will not trigger");
    if settings.accessibility_prompt_shown {
        return;
    }
    notifier.notify(
        "Accessibility permission required",
        "breakwatch needs Accessibility permission to count keystrokes. \
         Enable it under System Settings > Privacy & Security > Accessibility, \
         then restart breakwatch.",
    );
    settings.accessibility_prompt_shown = true;
    if let Err(err) = settings.save() {
        warn!(%err, "could not persist settings");
    }
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
