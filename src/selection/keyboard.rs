//! Keyboard simulation backed by the `enigo` crate.
//!
//! | Platform | Copy | Paste |
//! |----------|------|-------|
//! | macOS    | ⌘C   | ⌘V    |
//! | Windows  | Ctrl+C | Ctrl+V |
//! | Linux    | Ctrl+C | Ctrl+V |

use std::sync::Arc;

use enigo::{Direction, Enigo, Key, Keyboard, Settings};

use crate::hotkey::{ModifierKey, SyntheticKeys};

use super::SelectionError;

/// Simulated copy/paste shortcuts sent to the focused window.
pub trait KeySender: Send + Sync {
    /// Send the system copy shortcut.
    fn send_copy(&self) -> Result<(), SelectionError>;

    /// Send the system paste shortcut.
    fn send_paste(&self) -> Result<(), SelectionError>;
}

/// Sends real key events through `enigo`.
///
/// A new [`Enigo`] instance is created for each shortcut because `Enigo` is
/// not `Send` and the handle is cheap to construct.  Every modifier tap is
/// announced in `synthetic` first so the hotkey listener can ignore its echo.
#[derive(Debug, Clone, Default)]
pub struct EnigoKeys {
    synthetic: Arc<SyntheticKeys>,
}

impl EnigoKeys {
    pub fn new(synthetic: Arc<SyntheticKeys>) -> Self {
        Self { synthetic }
    }

    /// Press the platform shortcut modifier, click `letter`, release the
    /// modifier.
    fn send_shortcut(&self, letter: char) -> Result<(), SelectionError> {
        let mut enigo = Enigo::new(&Settings::default())
            .map_err(|e| SelectionError::KeySimulation(e.to_string()))?;

        self.synthetic.expect_tap(SHORTCUT_MODIFIER_KIND);
        if let Err(e) = enigo.key(SHORTCUT_MODIFIER, Direction::Press) {
            self.synthetic.clear();
            return Err(SelectionError::KeySimulation(e.to_string()));
        }
        let clicked = enigo
            .key(Key::Unicode(letter), Direction::Click)
            .map_err(|e| SelectionError::KeySimulation(e.to_string()));
        // Release even if the click failed so the modifier is not left stuck.
        enigo
            .key(SHORTCUT_MODIFIER, Direction::Release)
            .map_err(|e| SelectionError::KeySimulation(e.to_string()))?;

        clicked
    }
}

impl KeySender for EnigoKeys {
    fn send_copy(&self) -> Result<(), SelectionError> {
        self.send_shortcut('c')
    }

    fn send_paste(&self) -> Result<(), SelectionError> {
        self.send_shortcut('v')
    }
}

#[cfg(target_os = "macos")]
const SHORTCUT_MODIFIER: Key = Key::Meta;
#[cfg(target_os = "macos")]
const SHORTCUT_MODIFIER_KIND: ModifierKey = ModifierKey::Meta;

#[cfg(not(target_os = "macos"))]
const SHORTCUT_MODIFIER: Key = Key::Control;
#[cfg(not(target_os = "macos"))]
const SHORTCUT_MODIFIER_KIND: ModifierKey = ModifierKey::Ctrl;
