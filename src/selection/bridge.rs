//! Selection capture / replacement over the clipboard.
//!
//! # Capture
//!
//! 1. **Save** the current clipboard text.
//! 2. **Clear** the clipboard so stale content cannot pass for a selection.
//! 3. **Simulate** the copy shortcut.
//! 4. **Wait** `copy_delay` for the OS to publish the copied text.
//! 5. **Read** the clipboard.  Empty or whitespace-only means nothing was
//!    selected: the saved text is put back and `None` is returned.
//!
//! # Replacement
//!
//! Write the corrected text to the clipboard, then simulate paste.  Whether
//! the target application accepted the paste is not observable.

use std::time::Duration;

use super::clipboard::ClipboardAccess;
use super::keyboard::KeySender;
use super::{SelectionBridge, SelectionError};

/// [`SelectionBridge`] built from a clipboard and a key sender.
pub struct ClipboardBridge<C, K> {
    clipboard: C,
    keys: K,
    copy_delay: Duration,
}

impl<C: ClipboardAccess, K: KeySender> ClipboardBridge<C, K> {
    /// Create a bridge that waits `copy_delay` after the simulated copy.
    pub fn new(clipboard: C, keys: K, copy_delay: Duration) -> Self {
        Self {
            clipboard,
            keys,
            copy_delay,
        }
    }

    fn restore(&self, saved: Option<&str>) -> Result<(), SelectionError> {
        match saved {
            Some(text) => self.clipboard.set_text(text),
            None => Ok(()),
        }
    }

    fn copy_and_read(&self) -> Result<Option<String>, SelectionError> {
        self.clipboard.clear()?;
        self.keys.send_copy()?;
        std::thread::sleep(self.copy_delay);
        self.clipboard.get_text()
    }
}

impl<C: ClipboardAccess, K: KeySender> SelectionBridge for ClipboardBridge<C, K> {
    fn capture_selection(&self) -> Result<Option<String>, SelectionError> {
        let saved = self.clipboard.get_text()?;

        let copied = match self.copy_and_read() {
            Ok(copied) => copied,
            Err(e) => {
                if let Err(restore_err) = self.restore(saved.as_deref()) {
                    log::warn!("selection: clipboard restore failed: {restore_err}");
                }
                return Err(e);
            }
        };

        match copied {
            Some(text) if !text.trim().is_empty() => Ok(Some(text)),
            _ => {
                log::debug!("selection: nothing copied, restoring clipboard");
                self.restore(saved.as_deref())?;
                Ok(None)
            }
        }
    }

    fn replace_selection(&self, text: &str) -> Result<(), SelectionError> {
        self.clipboard.set_text(text)?;
        self.keys.send_paste()
    }
}

// ---------------------------------------------------------------------------
// FakeDesktop  (test-only)
// ---------------------------------------------------------------------------

/// In-memory clipboard + keyboard.  A simulated copy publishes `selection`
/// to the clipboard (nothing happens when the selection is empty, as on a
/// real desktop); a simulated paste records the clipboard content.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct FakeDesktop {
    state: std::sync::Arc<std::sync::Mutex<FakeDesktopState>>,
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct FakeDesktopState {
    pub clipboard: Option<String>,
    pub selection: String,
    pub copies: usize,
    pub pasted: Vec<String>,
    pub fail_copy: bool,
    pub fail_paste: bool,
}

#[cfg(test)]
impl FakeDesktop {
    pub fn new(clipboard: Option<&str>, selection: &str) -> Self {
        let desktop = Self::default();
        {
            let mut st = desktop.state();
            st.clipboard = clipboard.map(str::to_string);
            st.selection = selection.to_string();
        }
        desktop
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeDesktopState> {
        self.state.lock().unwrap()
    }

    /// Bridge over this desktop with no copy delay.
    pub fn bridge(&self) -> ClipboardBridge<FakeDesktop, FakeDesktop> {
        ClipboardBridge::new(self.clone(), self.clone(), Duration::ZERO)
    }
}

#[cfg(test)]
impl ClipboardAccess for FakeDesktop {
    fn get_text(&self) -> Result<Option<String>, SelectionError> {
        Ok(self.state().clipboard.clone())
    }

    fn set_text(&self, text: &str) -> Result<(), SelectionError> {
        self.state().clipboard = Some(text.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SelectionError> {
        self.state().clipboard = None;
        Ok(())
    }
}

#[cfg(test)]
impl KeySender for FakeDesktop {
    fn send_copy(&self) -> Result<(), SelectionError> {
        let mut st = self.state();
        if st.fail_copy {
            return Err(SelectionError::KeySimulation("copy refused".into()));
        }
        st.copies += 1;
        if !st.selection.is_empty() {
            st.clipboard = Some(st.selection.clone());
        }
        Ok(())
    }

    fn send_paste(&self) -> Result<(), SelectionError> {
        let mut st = self.state();
        if st.fail_paste {
            return Err(SelectionError::KeySimulation("paste refused".into()));
        }
        let pasted = st.clipboard.clone().unwrap_or_default();
        st.pasted.push(pasted);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_returns_selected_text() {
        let desktop = FakeDesktop::new(Some("old clip"), "Helo wrold");

        let captured = desktop.bridge().capture_selection().unwrap();

        assert_eq!(captured.as_deref(), Some("Helo wrold"));
        assert_eq!(desktop.state().copies, 1);
    }

    #[test]
    fn empty_selection_restores_original_clipboard() {
        let desktop = FakeDesktop::new(Some("user data"), "");

        let captured = desktop.bridge().capture_selection().unwrap();

        assert!(captured.is_none());
        assert_eq!(desktop.state().clipboard.as_deref(), Some("user data"));
    }

    #[test]
    fn whitespace_selection_counts_as_nothing_selected() {
        let desktop = FakeDesktop::new(Some("user data"), " \n\t ");

        let captured = desktop.bridge().capture_selection().unwrap();

        assert!(captured.is_none());
        assert_eq!(desktop.state().clipboard.as_deref(), Some("user data"));
    }

    #[test]
    fn stale_clipboard_is_not_mistaken_for_selection() {
        // Clipboard holds text but nothing is selected: the clear before the
        // copy must prevent the old text from being returned.
        let desktop = FakeDesktop::new(Some("stale"), "");

        assert!(desktop.bridge().capture_selection().unwrap().is_none());
    }

    #[test]
    fn failed_copy_restores_clipboard_and_errors() {
        let desktop = FakeDesktop::new(Some("user data"), "text");
        desktop.state().fail_copy = true;

        let result = desktop.bridge().capture_selection();

        assert!(matches!(result, Err(SelectionError::KeySimulation(_))));
        assert_eq!(desktop.state().clipboard.as_deref(), Some("user data"));
    }

    #[test]
    fn replace_stages_text_and_pastes_once() {
        let desktop = FakeDesktop::new(None, "Helo");

        desktop.bridge().replace_selection("Hello").unwrap();

        let st = desktop.state();
        assert_eq!(st.clipboard.as_deref(), Some("Hello"));
        assert_eq!(st.pasted, vec!["Hello".to_string()]);
    }

    #[test]
    fn capture_preserves_surrounding_whitespace() {
        let desktop = FakeDesktop::new(None, "  padded text\n");

        let captured = desktop.bridge().capture_selection().unwrap();

        assert_eq!(captured.as_deref(), Some("  padded text\n"));
    }
}
