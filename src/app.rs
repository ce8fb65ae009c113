//! Startup validation and wiring.
//!
//! [`load_config`] reads `settings.toml`; a file that exists but does not
//! parse is fatal rather than silently replaced by defaults.
//!
//! [`prepare`] turns an [`AppConfig`] into everything `main` needs before it
//! registers the global hotkeys.  The API key is resolved first: without it
//! `prepare` fails and no [`HotkeyBindings`] exist, so the listener can never
//! be started with a misconfigured service.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::{AppConfig, LlmProvider};
use crate::hotkey::{HotkeyBindings, HotkeyError, SyntheticKeys};
use crate::llm::{build_corrector, LlmCorrector};
use crate::pipeline::CorrectionController;
use crate::selection::{ClipboardBridge, EnigoKeys, SelectionBridge, SystemClipboard};

// ---------------------------------------------------------------------------
// StartupError
// ---------------------------------------------------------------------------

/// Fatal configuration problems detected before any hotkey is registered.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The settings file exists but cannot be read or parsed.
    #[error("cannot load {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    /// No API key in the environment or the settings file.
    #[error("no {provider} API key configured (set {env_var})")]
    MissingApiKey {
        provider: &'static str,
        env_var: String,
        console_url: &'static str,
    },

    /// A hotkey chord in the settings file is invalid.
    #[error("invalid hotkey configuration: {0}")]
    Hotkey(#[from] HotkeyError),
}

impl StartupError {
    /// Remediation lines shown to the user.
    pub fn guidance(&self) -> Vec<String> {
        match self {
            StartupError::Config { path, .. } => vec![
                format!("Fix the file at {}, or delete it to start from defaults.", path.display()),
            ],
            StartupError::MissingApiKey {
                env_var,
                console_url,
                ..
            } => vec![
                format!("Export {env_var}=<your key>, or set `api_key` under [llm] in settings.toml."),
                format!("Get a key at: {console_url}"),
            ],
            StartupError::Hotkey(_) => vec![
                "Fix `correct_key` / `exit_key` under [hotkey] in settings.toml, e.g. \"Ctrl+Q\"."
                    .into(),
            ],
        }
    }
}

/// Load settings from `path`.  A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, StartupError> {
    AppConfig::load_from(path).map_err(|e| StartupError::Config {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })
}

// ---------------------------------------------------------------------------
// Prepared
// ---------------------------------------------------------------------------

/// Validated components, ready for hotkey registration.
pub struct Prepared {
    pub controller: Arc<CorrectionController>,
    pub bindings: HotkeyBindings,
    /// Shared with the key sender inside the controller's bridge.
    pub synthetic: Arc<SyntheticKeys>,
    pub provider: LlmProvider,
    pub model: String,
}

/// Validate `config` and build the controller on the real desktop bridge.
///
/// `env` looks up environment variables.
pub fn prepare<F>(config: &AppConfig, env: F) -> Result<Prepared, StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    let synthetic = Arc::new(SyntheticKeys::default());
    let bridge: Arc<dyn SelectionBridge> = Arc::new(ClipboardBridge::new(
        SystemClipboard,
        EnigoKeys::new(Arc::clone(&synthetic)),
        Duration::from_millis(config.selection.copy_delay_ms),
    ));
    prepare_with(config, env, bridge, synthetic, build_corrector)
}

/// [`prepare`] with an explicit bridge and corrector factory.
pub fn prepare_with<F, B>(
    config: &AppConfig,
    env: F,
    bridge: Arc<dyn SelectionBridge>,
    synthetic: Arc<SyntheticKeys>,
    make_corrector: B,
) -> Result<Prepared, StartupError>
where
    F: Fn(&str) -> Option<String>,
    B: FnOnce(&crate::config::LlmConfig, String) -> Arc<dyn LlmCorrector>,
{
    let api_key = config
        .llm
        .resolve_api_key(env)
        .ok_or_else(|| StartupError::MissingApiKey {
            provider: config.llm.provider.label(),
            env_var: config.llm.effective_api_key_env().to_string(),
            console_url: config.llm.provider.key_console_url(),
        })?;

    let bindings = HotkeyBindings::from_config(&config.hotkey)?;

    let llm = make_corrector(&config.llm, api_key);
    let controller = Arc::new(CorrectionController::new(bridge, llm, config));

    Ok(Prepared {
        controller,
        bindings,
        synthetic,
        provider: config.llm.provider,
        model: config.llm.effective_model(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use crate::llm::LlmError;
    use crate::selection::FakeDesktop;

    struct EchoLlm;

    #[async_trait]
    impl LlmCorrector for EchoLlm {
        async fn correct(&self, text: &str, _max_tokens: u32) -> Result<String, LlmError> {
            Ok(text.to_string())
        }
    }

    fn fake_bridge() -> Arc<dyn SelectionBridge> {
        Arc::new(FakeDesktop::new(None, "").bridge())
    }

    #[test]
    fn missing_settings_file_loads_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = load_config(&dir.path().join("settings.toml"))
            .unwrap_or_else(|e| panic!("load failed: {e}"));
        assert_eq!(config.hotkey.correct_key, "Ctrl+Q");
    }

    #[test]
    fn unparsable_settings_file_is_fatal_and_names_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "[llm]\napi_key = \"sk-in-file\"\ntimeout_secs = \"thirty\"\n",
        )
        .expect("write settings");

        let err = load_config(&path).err().expect("must fail");

        assert!(matches!(err, StartupError::Config { .. }));
        assert!(err.to_string().contains("thirty"));
        let guidance = err.guidance().join("\n");
        assert!(guidance.contains(&path.display().to_string()));
        assert!(!guidance.contains("API key"));
    }

    #[test]
    fn missing_key_fails_before_anything_is_built() {
        let built = AtomicBool::new(false);
        let result = prepare_with(&AppConfig::default(), |_| None, fake_bridge(), Arc::default(), |_, _| {
            built.store(true, Ordering::SeqCst);
            Arc::new(EchoLlm) as Arc<dyn LlmCorrector>
        });

        let err = result.err().expect("must fail");
        assert!(matches!(err, StartupError::MissingApiKey { .. }));
        assert!(!built.load(Ordering::SeqCst));
    }

    #[test]
    fn missing_key_is_reported_before_bad_hotkey() {
        let mut config = AppConfig::default();
        config.hotkey.correct_key = "Ctrl+Nope".into();

        let err = prepare_with(&config, |_| None, fake_bridge(), Arc::default(), |_, _| {
            Arc::new(EchoLlm) as Arc<dyn LlmCorrector>
        })
        .err()
        .expect("must fail");

        assert!(matches!(err, StartupError::MissingApiKey { .. }));
    }

    #[test]
    fn missing_key_guidance_names_variable_and_console() {
        let mut config = AppConfig::default();
        config.llm.provider = LlmProvider::Anthropic;

        let err = prepare_with(&config, |_| None, fake_bridge(), Arc::default(), |_, _| {
            Arc::new(EchoLlm) as Arc<dyn LlmCorrector>
        })
        .err()
        .expect("must fail");

        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
        let guidance = err.guidance().join("\n");
        assert!(guidance.contains("ANTHROPIC_API_KEY"));
        assert!(guidance.contains("console.anthropic.com"));
    }

    #[test]
    fn bad_hotkey_is_a_startup_error() {
        let mut config = AppConfig::default();
        config.hotkey.exit_key = "Ctrl+Shift".into();

        let err = prepare_with(&config, |_| Some("sk".into()), fake_bridge(), Arc::default(), |_, _| {
            Arc::new(EchoLlm) as Arc<dyn LlmCorrector>
        })
        .err()
        .expect("must fail");

        assert!(matches!(err, StartupError::Hotkey(HotkeyError::MissingKey(_))));
    }

    #[test]
    fn valid_config_passes_key_to_corrector() {
        let prepared = prepare_with(
            &AppConfig::default(),
            |name| (name == "OPENAI_API_KEY").then(|| "sk-env".to_string()),
            fake_bridge(),
            Arc::default(),
            |llm, key| {
                assert_eq!(key, "sk-env");
                assert_eq!(llm.effective_model(), "gpt-4o-mini");
                Arc::new(EchoLlm) as Arc<dyn LlmCorrector>
            },
        )
        .unwrap_or_else(|e| panic!("prepare failed: {e}"));

        assert_eq!(prepared.provider, LlmProvider::OpenAi);
        assert_eq!(prepared.bindings.correct.key, rdev::Key::KeyQ);
        assert!(!prepared.controller.is_busy());
    }
}
