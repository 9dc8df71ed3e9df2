// Signal-driven shutdown and cleanup of running sessions

use crate::events::EventNotifier;
use crate::models::state_machine::is_active_state;
use crate::models::{SessionStatus, UpdateSessionInput};
use crate::server::SessionBroadcaster;
use crate::storage::SessionStore;
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub const SHUTDOWN_ERROR_MESSAGE: &str = "Interrupted by server shutdown";

/// Shutdown flag shared by the signal thread and the server
#[derive(Clone)]
pub struct ShutdownState {
    requested: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownState {
    pub fn new() -> Self {
        Self {
            requested: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Request a shutdown and wake every waiter
    pub fn request_shutdown(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
        log::info!("Shutdown requested, notifying server");
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Resolve once shutdown has been requested
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_shutdown_requested() {
                return;
            }
            notified.await;
        }
    }
}

impl Default for ShutdownState {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of [`cleanup`]
#[derive(Debug, Clone, Default)]
pub struct ShutdownResult {
    /// Sessions still running a pipeline, now marked as errored
    pub sessions_interrupted: Vec<String>,
    pub errors: Vec<String>,
}

impl ShutdownResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Fail sessions whose pipeline is cut off and close every event channel
pub fn cleanup(store: &SessionStore, notifier: &Arc<SessionBroadcaster>) -> ShutdownResult {
    let mut result = ShutdownResult::default();

    for session in store.list(None) {
        if !is_active_state(session.status) {
            continue;
        }
        let update = UpdateSessionInput::status(SessionStatus::Error).with_error(SHUTDOWN_ERROR_MESSAGE);
        match store.update(&session.id, update) {
            Ok(_) => {
                notifier.send_error(&session.id, SHUTDOWN_ERROR_MESSAGE, Some("SHUTDOWN"));
                result.sessions_interrupted.push(session.id);
            }
            Err(e) => result.errors.push(format!("{}: {}", session.id, e)),
        }
    }

    notifier.close_all();

    log::info!(
        "Shutdown cleanup complete: {} session(s) interrupted",
        result.sessions_interrupted.len()
    );
    for error in &result.errors {
        log::warn!("Could not interrupt session {}", error);
    }

    result
}

/// Request shutdown on SIGINT, SIGTERM or SIGHUP
#[cfg(unix)]
pub fn register_signal_handlers(state: ShutdownState) -> Result<()> {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;
    use std::thread;

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP])
        .map_err(|e| anyhow::anyhow!("Cannot install signal handlers: {}", e))?;

    thread::spawn(move || {
        for signal in signals.forever() {
            let name = match signal {
                SIGINT => "SIGINT (Ctrl+C)",
                SIGTERM => "SIGTERM",
                SIGHUP => "SIGHUP",
                _ => continue,
            };
            log::info!("Received {}", name);
            state.request_shutdown();
        }
    });

    log::debug!("Listening for SIGINT, SIGTERM and SIGHUP");
    Ok(())
}

/// Request shutdown on Ctrl+C
#[cfg(windows)]
pub fn register_signal_handlers(state: ShutdownState) -> Result<()> {
    ctrlc::set_handler(move || {
        log::info!("Ctrl+C received");
        state.request_shutdown();
    })
    .map_err(|e| anyhow::anyhow!("Cannot install Ctrl+C handler: {}", e))?;

    log::debug!("Listening for Ctrl+C");
    Ok(())
}
