//! Global hotkeys, backed by `rdev`.
//!
//! # Design
//!
//! `rdev::listen()` is a blocking OS-level call that never returns while the
//! process is alive.  It runs on a **dedicated OS thread** owned by
//! [`HotkeyListener`] and reports raw key events only, so chords are
//! recognised here: [`ChordMatcher`] tracks which modifiers are held and
//! turns a matching key press into a [`HotkeyEvent`].
//!
//! Chords are written as `"Mod+Mod+Key"` (modifiers `Ctrl`, `Shift`, `Alt`,
//! `Meta`), e.g. `"Ctrl+Q"` or `"Ctrl+Shift+Q"`.  Both modifier and key
//! names are case-insensitive.  Matching is exact on modifiers, so `Ctrl+Q`
//! does not fire while Shift is also held.
//!
//! Modifier taps injected by our own copy/paste shortcuts are filtered out
//! through [`SyntheticKeys`], so they do not disturb the held-modifier state.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use spellfix_hotkey::config::HotkeyConfig;
//! use spellfix_hotkey::hotkey::{HotkeyBindings, HotkeyListener, SyntheticKeys};
//!
//! let bindings = HotkeyBindings::from_config(&HotkeyConfig::default()).expect("bad chord");
//! let synthetic = Arc::new(SyntheticKeys::default());
//! let (tx, mut rx) = mpsc::channel(16);
//! let _listener = HotkeyListener::start(bindings, synthetic, tx).expect("listener");
//!
//! // In your async loop:
//! // while let Some(ev) = rx.recv().await { ... }
//! ```

pub mod listener;
pub mod synthetic;

pub use listener::HotkeyListener;
pub use synthetic::{ModifierKey, SyntheticKeys};

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::config::HotkeyConfig;

// ---------------------------------------------------------------------------
// HotkeyEvent
// ---------------------------------------------------------------------------

/// Events emitted by the hotkey listener thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyEvent {
    /// The correction chord was pressed.
    CorrectRequested,
    /// The exit chord was pressed.
    ExitRequested,
}

// ---------------------------------------------------------------------------
// HotkeyError
// ---------------------------------------------------------------------------

/// Errors from chord parsing or listener startup.
#[derive(Debug, Error)]
pub enum HotkeyError {
    /// A chord component is neither a modifier nor a known key.
    #[error("unknown key `{key}` in hotkey `{chord}`")]
    UnknownKey { chord: String, key: String },

    /// The chord consists of modifiers only.
    #[error("hotkey `{0}` has no non-modifier key")]
    MissingKey(String),

    /// Both actions are bound to the same chord.
    #[error("correct and exit hotkeys are both `{0}`")]
    Conflict(String),

    /// The listener thread could not be spawned.
    #[error("cannot start hotkey listener: {0}")]
    Spawn(String),
}

// ---------------------------------------------------------------------------
// Modifiers / KeyChord
// ---------------------------------------------------------------------------

/// Set of held modifier keys (left and right variants are merged).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    fn set(&mut self, modifier: ModifierKey, down: bool) {
        match modifier {
            ModifierKey::Ctrl => self.ctrl = down,
            ModifierKey::Shift => self.shift = down,
            ModifierKey::Alt => self.alt = down,
            ModifierKey::Meta => self.meta = down,
        }
    }
}

/// A modifier set plus one trigger key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyChord {
    pub modifiers: Modifiers,
    pub key: rdev::Key,
}

impl KeyChord {
    /// Parse a chord such as `"Ctrl+Shift+Q"`.
    ///
    /// ```
    /// use spellfix_hotkey::hotkey::KeyChord;
    ///
    /// let chord = KeyChord::parse("ctrl+shift+q").unwrap();
    /// assert!(chord.modifiers.ctrl && chord.modifiers.shift);
    /// assert_eq!(chord.key, rdev::Key::KeyQ);
    /// ```
    pub fn parse(chord: &str) -> Result<Self, HotkeyError> {
        let mut modifiers = Modifiers::default();
        let mut key = None;

        for part in chord.split('+').map(str::trim).filter(|p| !p.is_empty()) {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "shift" => modifiers.shift = true,
                "alt" | "option" => modifiers.alt = true,
                "meta" | "super" | "win" | "cmd" | "command" => modifiers.meta = true,
                _ => {
                    let parsed = parse_key(part).ok_or_else(|| HotkeyError::UnknownKey {
                        chord: chord.to_string(),
                        key: part.to_string(),
                    })?;
                    key = Some(parsed);
                }
            }
        }

        let key = key.ok_or_else(|| HotkeyError::MissingKey(chord.to_string()))?;
        Ok(Self { modifiers, key })
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.modifiers;
        for (held, name) in [
            (m.ctrl, "Ctrl"),
            (m.shift, "Shift"),
            (m.alt, "Alt"),
            (m.meta, "Meta"),
        ] {
            if held {
                write!(f, "{name}+")?;
            }
        }
        write!(f, "{:?}", self.key)
    }
}

// ---------------------------------------------------------------------------
// HotkeyBindings / ChordMatcher
// ---------------------------------------------------------------------------

/// The two chords the application listens for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotkeyBindings {
    pub correct: KeyChord,
    pub exit: KeyChord,
}

impl HotkeyBindings {
    /// Parse both chords from config.
    pub fn from_config(config: &HotkeyConfig) -> Result<Self, HotkeyError> {
        let correct = KeyChord::parse(&config.correct_key)?;
        let exit = KeyChord::parse(&config.exit_key)?;
        if correct == exit {
            return Err(HotkeyError::Conflict(config.correct_key.clone()));
        }
        Ok(Self { correct, exit })
    }
}

/// Turns a stream of raw key events into [`HotkeyEvent`]s.
///
/// Auto-repeat is suppressed: holding a chord fires once, and the trigger
/// key must be released before the chord can fire again.  Modifier events
/// recorded in `synthetic` are skipped.
#[derive(Debug)]
pub struct ChordMatcher {
    bindings: HotkeyBindings,
    synthetic: Arc<SyntheticKeys>,
    held: Modifiers,
    latched: Option<rdev::Key>,
}

impl ChordMatcher {
    pub fn new(bindings: HotkeyBindings, synthetic: Arc<SyntheticKeys>) -> Self {
        Self {
            bindings,
            synthetic,
            held: Modifiers::default(),
            latched: None,
        }
    }

    /// Track a modifier edge.  Returns `false` when `key` is not a modifier.
    fn track_modifier(&mut self, key: rdev::Key, down: bool) -> bool {
        let Some(modifier) = ModifierKey::of(key) else {
            return false;
        };
        if !self.synthetic.absorb(modifier, down) {
            self.held.set(modifier, down);
        }
        true
    }

    /// Feed one raw event; returns the hotkey it completes, if any.
    pub fn on_event(&mut self, event: &rdev::EventType) -> Option<HotkeyEvent> {
        match event {
            rdev::EventType::KeyPress(key) => {
                let key = *key;
                if self.track_modifier(key, true) {
                    return None;
                }
                if self.latched == Some(key) {
                    return None;
                }
                let pressed = KeyChord {
                    modifiers: self.held,
                    key,
                };
                let hit = if pressed == self.bindings.exit {
                    Some(HotkeyEvent::ExitRequested)
                } else if pressed == self.bindings.correct {
                    Some(HotkeyEvent::CorrectRequested)
                } else {
                    None
                };
                if hit.is_some() {
                    self.latched = Some(key);
                }
                hit
            }
            rdev::EventType::KeyRelease(key) => {
                let key = *key;
                if !self.track_modifier(key, false) && self.latched == Some(key) {
                    self.latched = None;
                }
                None
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// parse_key
// ---------------------------------------------------------------------------

/// Parse a key name from a config string into an [`rdev::Key`].
///
/// Supports F1–F12, common named keys, digits, and single ASCII letters.
/// Names are case-insensitive.
///
/// Returns `None` for unrecognised names.
///
/// # Examples
///
/// ```
/// use spellfix_hotkey::hotkey::parse_key;
///
/// assert_eq!(parse_key("F9"),      Some(rdev::Key::F9));
/// assert_eq!(parse_key("esc"),     Some(rdev::Key::Escape));
/// assert_eq!(parse_key("q"),       Some(rdev::Key::KeyQ));
/// assert_eq!(parse_key("xyz"),     None);
/// ```
pub fn parse_key(key_str: &str) -> Option<rdev::Key> {
    let name = key_str.to_ascii_lowercase();
    let key = match name.as_str() {
        // Function keys
        "f1" => rdev::Key::F1,
        "f2" => rdev::Key::F2,
        "f3" => rdev::Key::F3,
        "f4" => rdev::Key::F4,
        "f5" => rdev::Key::F5,
        "f6" => rdev::Key::F6,
        "f7" => rdev::Key::F7,
        "f8" => rdev::Key::F8,
        "f9" => rdev::Key::F9,
        "f10" => rdev::Key::F10,
        "f11" => rdev::Key::F11,
        "f12" => rdev::Key::F12,

        // Navigation / control
        "escape" | "esc" => rdev::Key::Escape,
        "space" => rdev::Key::Space,
        "return" | "enter" => rdev::Key::Return,
        "tab" => rdev::Key::Tab,
        "backspace" => rdev::Key::Backspace,
        "delete" | "del" => rdev::Key::Delete,
        "insert" | "ins" => rdev::Key::Insert,
        "home" => rdev::Key::Home,
        "end" => rdev::Key::End,
        "pageup" | "pgup" => rdev::Key::PageUp,
        "pagedown" | "pgdn" => rdev::Key::PageDown,
        "pause" => rdev::Key::Pause,
        "printscreen" => rdev::Key::PrintScreen,

        // Digits
        "0" => rdev::Key::Num0,
        "1" => rdev::Key::Num1,
        "2" => rdev::Key::Num2,
        "3" => rdev::Key::Num3,
        "4" => rdev::Key::Num4,
        "5" => rdev::Key::Num5,
        "6" => rdev::Key::Num6,
        "7" => rdev::Key::Num7,
        "8" => rdev::Key::Num8,
        "9" => rdev::Key::Num9,

        // Letters
        "a" => rdev::Key::KeyA,
        "b" => rdev::Key::KeyB,
        "c" => rdev::Key::KeyC,
        "d" => rdev::Key::KeyD,
        "e" => rdev::Key::KeyE,
        "f" => rdev::Key::KeyF,
        "g" => rdev::Key::KeyG,
        "h" => rdev::Key::KeyH,
        "i" => rdev::Key::KeyI,
        "j" => rdev::Key::KeyJ,
        "k" => rdev::Key::KeyK,
        "l" => rdev::Key::KeyL,
        "m" => rdev::Key::KeyM,
        "n" => rdev::Key::KeyN,
        "o" => rdev::Key::KeyO,
        "p" => rdev::Key::KeyP,
        "q" => rdev::Key::KeyQ,
        "r" => rdev::Key::KeyR,
        "s" => rdev::Key::KeyS,
        "t" => rdev::Key::KeyT,
        "u" => rdev::Key::KeyU,
        "v" => rdev::Key::KeyV,
        "w" => rdev::Key::KeyW,
        "x" => rdev::Key::KeyX,
        "y" => rdev::Key::KeyY,
        "z" => rdev::Key::KeyZ,

        _ => return None,
    };
    Some(key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
