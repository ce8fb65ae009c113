//! Bookkeeping for modifier events this process injects itself.
//!
//! The global hook sees the Ctrl (or ⌘) press/release that the copy and
//! paste shortcuts send.  Left alone, the synthetic release would clear the
//! matcher's "Ctrl held" flag while the user is still physically holding
//! Ctrl.  The key sender records each tap here first, and
//! [`ChordMatcher`](super::ChordMatcher) drops the matching echoes.
//!
//! An expectation that is never observed expires after [`ECHO_WINDOW`].

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// How long an injected event may take to come back through the hook.
pub const ECHO_WINDOW: Duration = Duration::from_secs(1);

/// Modifier class, with left/right variants merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKey {
    Ctrl,
    Shift,
    Alt,
    Meta,
}

impl ModifierKey {
    /// Classify a raw key; `None` for non-modifiers.
    pub fn of(key: rdev::Key) -> Option<Self> {
        match key {
            rdev::Key::ControlLeft | rdev::Key::ControlRight => Some(Self::Ctrl),
            rdev::Key::ShiftLeft | rdev::Key::ShiftRight => Some(Self::Shift),
            rdev::Key::Alt | rdev::Key::AltGr => Some(Self::Alt),
            rdev::Key::MetaLeft | rdev::Key::MetaRight => Some(Self::Meta),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Expected {
    modifier: ModifierKey,
    down: bool,
    deadline: Instant,
}

/// Shared between the key sender (producer) and the hotkey listener thread
/// (consumer).
#[derive(Debug, Default)]
pub struct SyntheticKeys {
    pending: Mutex<VecDeque<Expected>>,
}

impl SyntheticKeys {
    /// Record that `modifier` is about to be pressed and released.
    pub fn expect_tap(&self, modifier: ModifierKey) {
        self.expect_tap_at(modifier, Instant::now());
    }

    /// Drop all outstanding expectations (the injection failed).
    pub fn clear(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.clear();
        }
    }

    /// `true` if this press/release is an echo of an injected tap; the
    /// expectation is consumed.
    pub fn absorb(&self, modifier: ModifierKey, down: bool) -> bool {
        self.absorb_at(modifier, down, Instant::now())
    }

    fn expect_tap_at(&self, modifier: ModifierKey, now: Instant) {
        let deadline = now + ECHO_WINDOW;
        if let Ok(mut pending) = self.pending.lock() {
            pending.push_back(Expected {
                modifier,
                down: true,
                deadline,
            });
            pending.push_back(Expected {
                modifier,
                down: false,
                deadline,
            });
        }
    }

    fn absorb_at(&self, modifier: ModifierKey, down: bool, now: Instant) -> bool {
        let Ok(mut pending) = self.pending.lock() else {
            return false;
        };
        pending.retain(|e| e.deadline >= now);
        match pending
            .iter()
            .position(|e| e.modifier == modifier && e.down == down)
        {
            Some(index) => {
                pending.remove(index);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tap_absorbs_one_press_and_one_release() {
        let keys = SyntheticKeys::default();
        keys.expect_tap(ModifierKey::Ctrl);

        assert!(keys.absorb(ModifierKey::Ctrl, true));
        assert!(keys.absorb(ModifierKey::Ctrl, false));
        assert!(!keys.absorb(ModifierKey::Ctrl, false));
    }

    #[test]
    fn other_modifiers_pass_through() {
        let keys = SyntheticKeys::default();
        keys.expect_tap(ModifierKey::Ctrl);

        assert!(!keys.absorb(ModifierKey::Shift, true));
        assert!(!keys.absorb(ModifierKey::Meta, false));
    }

    #[test]
    fn expectations_expire() {
        let keys = SyntheticKeys::default();
        let t0 = Instant::now();
        keys.expect_tap_at(ModifierKey::Ctrl, t0);

        let late = t0 + ECHO_WINDOW + Duration::from_millis(1);
        assert!(!keys.absorb_at(ModifierKey::Ctrl, false, late));
    }

    #[test]
    fn clear_forgets_pending_taps() {
        let keys = SyntheticKeys::default();
        keys.expect_tap(ModifierKey::Meta);
        keys.clear();

        assert!(!keys.absorb(ModifierKey::Meta, true));
    }
}
