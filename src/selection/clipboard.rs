//! Clipboard access backed by the `arboard` crate.
//!
//! [`SystemClipboard`] creates a short-lived [`arboard::Clipboard`] handle per
//! call rather than holding one, because `arboard::Clipboard` is not `Send`
//! on all platforms and the handle is cheap to create.

use arboard::Clipboard;

use super::SelectionError;

/// Plain-text clipboard operations used by the capture/replace protocol.
pub trait ClipboardAccess: Send + Sync {
    /// Current plain-text content, or `None` when the clipboard is empty or
    /// holds non-text data.
    fn get_text(&self) -> Result<Option<String>, SelectionError>;

    /// Replace the clipboard content with `text`.
    fn set_text(&self, text: &str) -> Result<(), SelectionError>;

    /// Empty the clipboard.
    fn clear(&self) -> Result<(), SelectionError>;
}

/// The OS clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl ClipboardAccess for SystemClipboard {
    fn get_text(&self) -> Result<Option<String>, SelectionError> {
        let mut clipboard = open_clipboard()?;
        // `get_text` returns Err if empty or non-text, treat both as None
        Ok(clipboard.get_text().ok())
    }

    fn set_text(&self, text: &str) -> Result<(), SelectionError> {
        let mut clipboard = open_clipboard()?;
        clipboard
            .set_text(text)
            .map_err(|e| SelectionError::ClipboardSet(e.to_string()))
    }

    fn clear(&self) -> Result<(), SelectionError> {
        let mut clipboard = open_clipboard()?;
        clipboard
            .clear()
            .map_err(|e| SelectionError::ClipboardSet(e.to_string()))
    }
}

fn open_clipboard() -> Result<Clipboard, SelectionError> {
    Clipboard::new().map_err(|e| SelectionError::ClipboardAccess(e.to_string()))
}
