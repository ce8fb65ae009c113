//! Correction controller and hotkey dispatcher.
//!
//! [`CorrectionController`] runs one capture → correct → replace cycle per
//! request and owns the single-permit guard that keeps cycles from
//! overlapping.  [`run_dispatcher`] consumes [`HotkeyEvent`]s and starts a
//! cycle per correction request.
//!
//! # Cycle flow
//!
//! ```text
//! request_correction()
//!   ├─ guard taken            → Busy
//!   ├─ controller shut down   → ShutDown
//!   └─ spawn_blocking(capture_selection)
//!         ├─ None             → NoSelection       (clipboard restored)
//!         ├─ Err              → CaptureFailed
//!         └─ Some(text) → llm.correct(text, budget)
//!               ├─ Err / empty → ServiceFailed
//!               ├─ same text   → Unchanged
//!               └─ new text    → spawn_blocking(replace_selection)
//!                                  ├─ Ok  → Replaced
//!                                  └─ Err → ReplaceFailed
//! ```
//!
//! The guard is a `SemaphorePermit` held for the whole cycle, so it is
//! released on every return path and on panic unwind.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore, TryAcquireError};
use tokio::task::JoinSet;

use crate::config::AppConfig;
use crate::hotkey::HotkeyEvent;
use crate::llm::{output_budget, LlmCorrector, LlmError};
use crate::selection::SelectionBridge;

use super::state::{preview, CycleOutcome};

// ---------------------------------------------------------------------------
// CorrectionController
// ---------------------------------------------------------------------------

/// Orchestrates correction cycles and enforces single-flight execution.
pub struct CorrectionController {
    bridge: Arc<dyn SelectionBridge>,
    llm: Arc<dyn LlmCorrector>,
    guard: Semaphore,
    budget_multiplier: u32,
    min_output_tokens: u32,
    preview_chars: usize,
}

impl CorrectionController {
    /// Create a controller.
    ///
    /// * `bridge` — clipboard/selection bridge (e.g. `ClipboardBridge`).
    /// * `llm`    — correction service client.
    /// * `config` — budget and preview settings are read from here.
    pub fn new(
        bridge: Arc<dyn SelectionBridge>,
        llm: Arc<dyn LlmCorrector>,
        config: &AppConfig,
    ) -> Self {
        Self {
            bridge,
            llm,
            guard: Semaphore::new(1),
            budget_multiplier: config.llm.budget_multiplier,
            min_output_tokens: config.llm.min_output_tokens,
            preview_chars: config.selection.preview_chars,
        }
    }

    /// `true` while a cycle is in flight.
    pub fn is_busy(&self) -> bool {
        !self.guard.is_closed() && self.guard.available_permits() == 0
    }

    /// Run one correction cycle unless another one is in flight.
    ///
    /// Never panics on external failures; every failure is reported as a
    /// [`CycleOutcome`] and logged.
    pub async fn request_correction(&self) -> CycleOutcome {
        let _permit = match self.guard.try_acquire() {
            Ok(permit) => permit,
            Err(TryAcquireError::NoPermits) => {
                let outcome = CycleOutcome::Busy;
                outcome.report();
                return outcome;
            }
            Err(TryAcquireError::Closed) => {
                let outcome = CycleOutcome::ShutDown;
                outcome.report();
                return outcome;
            }
        };

        log::info!("Starting correction...");
        let outcome = self.run_cycle().await;
        outcome.report();
        outcome
    }

    /// Refuse all further cycles.  An in-flight cycle keeps its permit
    /// until it finishes or is aborted.  Idempotent.
    pub fn shutdown(&self) {
        if !self.guard.is_closed() {
            self.guard.close();
            log::info!("Shutting down the corrector...");
        }
    }

    async fn run_cycle(&self) -> CycleOutcome {
        // ── 1. Capture (blocking → thread pool) ──────────────────────────
        let bridge = Arc::clone(&self.bridge);
        let captured =
            match tokio::task::spawn_blocking(move || bridge.capture_selection()).await {
                Ok(Ok(Some(text))) => text,
                Ok(Ok(None)) => return CycleOutcome::NoSelection,
                Ok(Err(e)) => return CycleOutcome::CaptureFailed(e.to_string()),
                Err(e) => return CycleOutcome::Internal(e.to_string()),
            };

        log::info!("Captured: {}", preview(&captured, self.preview_chars));

        // ── 2. Correct ───────────────────────────────────────────────────
        let budget = output_budget(&captured, self.budget_multiplier, self.min_output_tokens);
        log::debug!("pipeline: requesting correction (budget={budget})");

        let corrected = match self.llm.correct(&captured, budget).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => return CycleOutcome::ServiceFailed(LlmError::EmptyResponse.to_string()),
            Err(e) => return CycleOutcome::ServiceFailed(e.to_string()),
        };

        // ── 3. Compare ───────────────────────────────────────────────────
        if captured.trim() == corrected.trim() {
            return CycleOutcome::Unchanged;
        }

        log::debug!("pipeline: corrected = {:?}", corrected);

        // ── 4. Replace (blocking → thread pool) ──────────────────────────
        let bridge = Arc::clone(&self.bridge);
        match tokio::task::spawn_blocking(move || bridge.replace_selection(&corrected)).await {
            Ok(Ok(())) => CycleOutcome::Replaced,
            Ok(Err(e)) => CycleOutcome::ReplaceFailed(e.to_string()),
            Err(e) => CycleOutcome::Internal(e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Why [`run_dispatcher`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchEnd {
    /// The exit hotkey was pressed; in-flight cycles were abandoned.
    ExitRequested,
    /// The hotkey channel closed; in-flight cycles were allowed to finish.
    ListenerClosed,
}

/// Consume hotkey events until exit is requested or the channel closes.
///
/// Each correction request is spawned as its own task so a press during an
/// active cycle reaches the busy guard immediately instead of queueing
/// behind it.  Panics inside a cycle are contained in its task and logged.
pub async fn run_dispatcher(
    controller: Arc<CorrectionController>,
    mut hotkey_rx: mpsc::Receiver<HotkeyEvent>,
) -> DispatchEnd {
    let mut in_flight: JoinSet<CycleOutcome> = JoinSet::new();

    let end = loop {
        tokio::select! {
            event = hotkey_rx.recv() => match event {
                Some(HotkeyEvent::CorrectRequested) => {
                    let controller = Arc::clone(&controller);
                    in_flight.spawn(async move { controller.request_correction().await });
                }
                Some(HotkeyEvent::ExitRequested) => break DispatchEnd::ExitRequested,
                None => break DispatchEnd::ListenerClosed,
            },
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                log_joined(joined);
            }
        }
    };

    match end {
        DispatchEnd::ExitRequested => in_flight.abort_all(),
        DispatchEnd::ListenerClosed => {
            while let Some(joined) = in_flight.join_next().await {
                log_joined(joined);
            }
        }
    }

    log::debug!("pipeline: dispatcher stopped ({end:?})");
    end
}

fn log_joined(joined: Result<CycleOutcome, tokio::task::JoinError>) {
    match joined {
        Ok(outcome) => log::debug!("pipeline: cycle finished ({})", outcome.label()),
        Err(e) if e.is_panic() => log::error!("Unexpected error during correction: {e}"),
        Err(_) => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
