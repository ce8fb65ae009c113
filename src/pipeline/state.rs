//! Outcome of one correction cycle.
//!
//! Every way a cycle can end maps to exactly one [`CycleOutcome`], and each
//! outcome has its own status line so the user can always tell what
//! happened.

use std::fmt;

// ---------------------------------------------------------------------------
// CycleOutcome
// ---------------------------------------------------------------------------

/// How a call to `CorrectionController::request_correction` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle was in flight; nothing was done.
    Busy,
    /// The controller has been shut down; nothing was done.
    ShutDown,
    /// Nothing was selected; the clipboard was restored.
    NoSelection,
    /// The clipboard or copy keystroke failed.
    CaptureFailed(String),
    /// The correction service failed or returned nothing.
    ServiceFailed(String),
    /// The service returned the same text (ignoring surrounding whitespace).
    Unchanged,
    /// The selection was replaced with the corrected text.
    Replaced,
    /// The corrected text could not be staged or pasted.
    ReplaceFailed(String),
    /// An unexpected internal failure (e.g. a panicked blocking task).
    Internal(String),
}

impl CycleOutcome {
    /// Short machine-friendly label.
    ///
    /// ```
    /// use spellfix_hotkey::pipeline::CycleOutcome;
    ///
    /// assert_eq!(CycleOutcome::Replaced.label(), "replaced");
    /// assert_eq!(CycleOutcome::Busy.label(), "busy");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Busy => "busy",
            CycleOutcome::ShutDown => "shut-down",
            CycleOutcome::NoSelection => "no-selection",
            CycleOutcome::CaptureFailed(_) => "capture-failed",
            CycleOutcome::ServiceFailed(_) => "service-failed",
            CycleOutcome::Unchanged => "unchanged",
            CycleOutcome::Replaced => "replaced",
            CycleOutcome::ReplaceFailed(_) => "replace-failed",
            CycleOutcome::Internal(_) => "internal-error",
        }
    }

    /// `true` for outcomes caused by a failure rather than user state.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            CycleOutcome::CaptureFailed(_)
                | CycleOutcome::ServiceFailed(_)
                | CycleOutcome::ReplaceFailed(_)
                | CycleOutcome::Internal(_)
        )
    }

    /// Write the status line to the log at a level matching the outcome.
    pub fn report(&self) {
        if self.is_failure() {
            log::error!("{self}");
        } else if matches!(self, CycleOutcome::Busy | CycleOutcome::ShutDown) {
            log::warn!("{self}");
        } else {
            log::info!("{self}");
        }
    }
}

impl fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleOutcome::Busy => write!(f, "Correction already in progress"),
            CycleOutcome::ShutDown => write!(f, "Shutting down, correction ignored"),
            CycleOutcome::NoSelection => write!(f, "No text selected"),
            CycleOutcome::CaptureFailed(msg) => write!(f, "Could not read the selection: {msg}"),
            CycleOutcome::ServiceFailed(msg) => write!(f, "Could not correct the text: {msg}"),
            CycleOutcome::Unchanged => write!(f, "Text needed no corrections"),
            CycleOutcome::Replaced => write!(f, "Text corrected and pasted"),
            CycleOutcome::ReplaceFailed(msg) => {
                write!(f, "Could not paste the corrected text: {msg}")
            }
            CycleOutcome::Internal(msg) => write!(f, "Internal error during correction: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// preview
// ---------------------------------------------------------------------------

/// First `max_chars` characters of `text`, with `...` appended when cut.
///
/// ```
/// use spellfix_hotkey::pipeline::preview;
///
/// assert_eq!(preview("short", 50), "short");
/// assert_eq!(preview("abcdef", 3), "abc...");
/// ```
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
