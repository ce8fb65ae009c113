//! Correction workflow.
//!
//! # Architecture
//!
//! ```text
//! HotkeyListener (OS thread, rdev)
//!        │ HotkeyEvent (mpsc)
//!        ▼
//! run_dispatcher()  ← async tokio task
//!        │
//!        ├─ CorrectRequested → spawn CorrectionController::request_correction()
//!        │                        capture → correct → replace
//!        │
//!        └─ ExitRequested    → return; caller shuts the controller down
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use spellfix_hotkey::config::AppConfig;
//! use spellfix_hotkey::pipeline::{run_dispatcher, CorrectionController};
//!
//! # async fn example() {
//! # use spellfix_hotkey::llm::LlmCorrector;
//! # use spellfix_hotkey::selection::SelectionBridge;
//! # fn make_bridge() -> Arc<dyn SelectionBridge> { unimplemented!() }
//! # fn make_llm() -> Arc<dyn LlmCorrector> { unimplemented!() }
//! let config = AppConfig::default();
//! let controller = Arc::new(CorrectionController::new(make_bridge(), make_llm(), &config));
//!
//! let (hotkey_tx, hotkey_rx) = mpsc::channel(16);
//! // hotkey_tx is passed to HotkeyListener::start(...)
//! # drop(hotkey_tx);
//! run_dispatcher(Arc::clone(&controller), hotkey_rx).await;
//! controller.shutdown();
//! # }
//! ```

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{run_dispatcher, CorrectionController, DispatchEnd};
pub use state::{preview, CycleOutcome};
