//! Application entry point — selection spell-fixer.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load `AppConfig` from disk (defaults on first run; a broken file is
//!    fatal).
//! 3. Validate it with [`app::prepare`]: a missing API key or a bad chord
//!    ends the process here, before any hotkey is registered.
//! 4. Create the [`tokio`] runtime (multi-thread, 2 workers).
//! 5. Start the hotkey listener thread.
//! 6. Run the dispatcher until the exit chord, Ctrl-C, or listener failure.
//! 7. Stop the listener, shut the controller down, exit.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use spellfix_hotkey::{
    app::{self, Prepared, StartupError},
    config::AppPaths,
    hotkey::{HotkeyEvent, HotkeyListener},
    pipeline::{run_dispatcher, DispatchEnd},
};
use tokio::sync::mpsc;

fn main() -> ExitCode {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("spellfix-hotkey starting up");

    // 2. Configuration
    let config = match app::load_config(&AppPaths::new().settings_file) {
        Ok(config) => config,
        Err(e) => return startup_failure(&e),
    };

    // 3. Validation
    let prepared = match app::prepare(&config, |name| std::env::var(name).ok()) {
        Ok(prepared) => prepared,
        Err(e) => return startup_failure(&e),
    };

    // 4. Tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("Failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let code = rt.block_on(run(prepared));

    // Blocking clipboard work from an abandoned cycle must not hold up exit.
    rt.shutdown_timeout(Duration::from_millis(500));
    code
}

fn startup_failure(e: &StartupError) -> ExitCode {
    log::error!("{e}");
    for line in e.guidance() {
        log::error!("  {line}");
    }
    ExitCode::FAILURE
}

async fn run(prepared: Prepared) -> ExitCode {
    let Prepared {
        controller,
        bindings,
        synthetic,
        provider,
        model,
    } = prepared;

    // 5. Hotkey listener thread
    let (hotkey_tx, hotkey_rx) = mpsc::channel::<HotkeyEvent>(16);
    let listener = match HotkeyListener::start(bindings, synthetic, hotkey_tx) {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    log::info!("Spell-fixer ready ({} / {model})", provider.label());
    log::info!("Select text and press {} to correct it", bindings.correct);
    log::info!("Press {} to quit", bindings.exit);

    // 6. Dispatch until exit
    let end = tokio::select! {
        end = run_dispatcher(Arc::clone(&controller), hotkey_rx) => Some(end),
        _ = tokio::signal::ctrl_c() => None,
    };

    // 7. Shutdown
    listener.stop();
    controller.shutdown();

    match end {
        Some(DispatchEnd::ExitRequested) => {
            log::info!("Goodbye!");
            ExitCode::SUCCESS
        }
        None => {
            log::info!("Interrupted by user, goodbye!");
            ExitCode::SUCCESS
        }
        Some(DispatchEnd::ListenerClosed) => {
            log::error!("Hotkey listener stopped unexpectedly");
            ExitCode::FAILURE
        }
    }
}
