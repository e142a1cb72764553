//! tokio-driven draft autosave
//!
//! [`AutosaveTimer`] is a cancellable single-shot timer: each restart aborts
//! the pending task and spawns a new one. The session's own debounce
//! deadline decides whether the draft is actually written when it fires.

use jurnal_common::session::FormSession;
use jurnal_common::store::KeyValueBackend;
use log::{debug, error};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Current instant on tokio's clock (follows paused time in tests)
pub fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

#[derive(Debug)]
pub struct AutosaveTimer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl AutosaveTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel the pending trigger and run `task` after the delay instead.
    ///
    /// Must be called from within a tokio runtime.
    pub fn restart<F>(&mut self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for AutosaveTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Restart `timer` so that it polls the session's autosave when it fires.
pub fn schedule_draft<B>(timer: &mut AutosaveTimer, session: &Arc<Mutex<FormSession<B>>>)
where
    B: KeyValueBackend + Send + 'static,
{
    let session = Arc::clone(session);
    timer.restart(move || {
        let Ok(mut guard) = session.lock() else {
            error!("autosave skipped: session lock poisoned");
            return;
        };
        match guard.poll_autosave(now()) {
            Ok(true) => debug!("draft autosaved"),
            Ok(false) => {}
            Err(e) => error!("autosave failed: {}", e),
        }
    });
}
