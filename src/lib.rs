//! Select text anywhere, press a hotkey, get it back with spelling and
//! grammar fixed by a remote LLM.
//!
//! * [`config`]    — `settings.toml` model and persistence.
//! * [`hotkey`]    — global chord listener (`rdev`).
//! * [`selection`] — clipboard/selection bridge (`arboard` + `enigo`).
//! * [`llm`]       — correction service clients (`reqwest`).
//! * [`pipeline`]  — correction controller and hotkey dispatcher.
//! * [`app`]       — startup validation and wiring.

pub mod app;
pub mod config;
pub mod hotkey;
pub mod llm;
pub mod pipeline;
pub mod selection;
