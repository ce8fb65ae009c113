//! Clipboard/selection bridge.
//!
//! The correction controller never touches the clipboard directly.  It talks
//! to a [`SelectionBridge`] with two operations:
//!
//! * [`SelectionBridge::capture_selection`] — copy the active selection out
//!   through the clipboard, restoring the user's clipboard if nothing was
//!   selected.
//! * [`SelectionBridge::replace_selection`] — paste replacement text over the
//!   still-active selection.
//!
//! [`ClipboardBridge`] implements the protocol on top of two capabilities,
//! [`ClipboardAccess`] (`arboard`) and [`KeySender`] (`enigo`).
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use spellfix_hotkey::selection::{
//!     ClipboardBridge, EnigoKeys, SelectionBridge, SystemClipboard,
//! };
//!
//! let bridge = ClipboardBridge::new(SystemClipboard, EnigoKeys::default(), Duration::from_millis(100));
//! if let Some(text) = bridge.capture_selection().expect("capture failed") {
//!     bridge.replace_selection(&text.to_uppercase()).expect("paste failed");
//! }
//! ```

pub mod bridge;
pub mod clipboard;
pub mod keyboard;

pub use bridge::ClipboardBridge;
pub use clipboard::{ClipboardAccess, SystemClipboard};
pub use keyboard::{EnigoKeys, KeySender};

#[cfg(test)]
pub use bridge::FakeDesktop;

use thiserror::Error;

// ---------------------------------------------------------------------------
// SelectionError
// ---------------------------------------------------------------------------

/// Errors that can surface while capturing or replacing the selection.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// Could not open or read the system clipboard.
    #[error("cannot access clipboard: {0}")]
    ClipboardAccess(String),

    /// Could not write to (or clear) the system clipboard.
    #[error("cannot set clipboard text: {0}")]
    ClipboardSet(String),

    /// Could not simulate a key press/release event.
    #[error("cannot simulate key press: {0}")]
    KeySimulation(String),
}

// ---------------------------------------------------------------------------
// SelectionBridge
// ---------------------------------------------------------------------------

/// Moves the active text selection into and out of the clipboard.
///
/// Both operations block (keystroke delivery, the post-copy delay), so async
/// callers should run them on `tokio::task::spawn_blocking`.
pub trait SelectionBridge: Send + Sync {
    /// Copy the active selection.  `Ok(None)` means nothing was selected and
    /// the clipboard has been restored.
    fn capture_selection(&self) -> Result<Option<String>, SelectionError>;

    /// Replace the active selection with `text` via clipboard + paste.
    fn replace_selection(&self, text: &str) -> Result<(), SelectionError>;
}
