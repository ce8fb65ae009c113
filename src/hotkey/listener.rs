//! Dedicated OS-thread hotkey listener using `rdev::listen`.
//!
//! [`HotkeyListener`] owns that thread and a stop flag; [`stop`] (or drop)
//! sets the flag so the callback silently ignores further events.
//!
//! # Shutdown caveat
//!
//! `rdev::listen` has **no graceful shutdown API**.  Setting the stop flag
//! prevents events from being forwarded, but the OS thread itself remains
//! blocked in the rdev event loop until the process exits.
//!
//! [`stop`]: HotkeyListener::stop

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tokio::sync::mpsc;

use super::{ChordMatcher, HotkeyBindings, HotkeyError, HotkeyEvent, SyntheticKeys};

// ---------------------------------------------------------------------------
// HotkeyListener
// ---------------------------------------------------------------------------

/// Handle to a running hotkey listener thread.
pub struct HotkeyListener {
    /// Shared stop flag, set by [`HotkeyListener::stop`] and on drop.
    stop: Arc<AtomicBool>,
    /// Kept so the thread is not detached; never joined because
    /// `rdev::listen` never returns.
    _thread: std::thread::JoinHandle<()>,
}

impl HotkeyListener {
    /// Spawn a dedicated OS thread that watches global key events and sends
    /// a [`HotkeyEvent`] on `tx` whenever one of `bindings` is pressed.
    ///
    /// `synthetic` must be the same instance the key sender records its
    /// injected shortcuts in.  The thread uses `blocking_send`, which is safe
    /// from a non-async context.
    pub fn start(
        bindings: HotkeyBindings,
        synthetic: Arc<SyntheticKeys>,
        tx: mpsc::Sender<HotkeyEvent>,
    ) -> Result<Self, HotkeyError> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_clone = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || {
                let mut matcher = ChordMatcher::new(bindings, synthetic);

                let result = rdev::listen(move |event| {
                    if stop_clone.load(Ordering::Relaxed) {
                        return;
                    }

                    if let Some(hotkey) = matcher.on_event(&event.event_type) {
                        log::debug!("hotkey-listener: {hotkey:?}");
                        let _ = tx.blocking_send(hotkey);
                    }
                });

                if let Err(e) = result {
                    log::error!("hotkey-listener: rdev::listen exited with error: {:?}", e);
                }
            })
            .map_err(|e| HotkeyError::Spawn(e.to_string()))?;

        log::info!(
            "hotkey-listener: watching {} (correct) and {} (exit)",
            bindings.correct,
            bindings.exit
        );

        Ok(Self {
            stop,
            _thread: thread,
        })
    }

    /// Stop forwarding events.  Idempotent.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// `true` once [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop();
    }
}
