use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use peek_capture::{HotkeyRegistry, ScreenCapturer};
use peek_config::Config;
use peek_types::HotkeyAction;
use peek_vision::{GeminiClient, VisionClient};

use self::controller::AppController;
use self::profile::ProfileStore;

pub mod controller;
pub mod coordinator;
pub mod events;
pub mod logging;
pub mod profile;

#[cfg(test)]
mod tests;

/// Screenshot to vision API to floating overlay, on a global hotkey
#[derive(Parser, Debug)]
#[command(name = "peek", version)]
struct Args {
    /// Profile to load from the user config folder
    #[arg(long, default_value = "main")]
    profile: String,

    /// Load this config JSON instead of a profile
    #[arg(long)]
    config: Option<PathBuf>,

    /// Create a new profile cloned from main and exit
    #[arg(long, value_name = "NAME")]
    new_profile: Option<String>,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Print the effective config and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // .env is optional
    let dotenv = dotenvy::dotenv();
    logging::init(args.log_json);
    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    if let Some(name) = &args.new_profile {
        let store = ProfileStore::default_location()?;
        store.init()?;
        let path = store.add_from_main(name)?;
        println!("{}", path.display());
        return Ok(());
    }

    let config = load_config(&args)?;

    if args.print_config {
        let mut shown = config.clone();
        if !shown.vision.api_key.is_empty() {
            shown.vision.api_key = "<redacted>".into();
        }
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    run(config)
}

fn load_config(args: &Args) -> anyhow::Result<Config> {
    let config = match &args.config {
        Some(path) => profile::load_config_file(path)?,
        None => {
            let store = ProfileStore::default_location()?;
            if let Err(e) = store.init() {
                tracing::warn!("Could not initialize profiles: {:#}", e);
            }
            store.load(&args.profile)?
        }
    };

    Ok(config.with_env_overrides())
}

/// Hotkey setup errors suggest elevation when not already elevated
fn with_elevation_hint(err: anyhow::Error, elevated: bool) -> anyhow::Error {
    if elevated {
        err
    } else {
        err.context("Hotkey setup failed; try running with elevated privileges")
    }
}

fn run(config: Config) -> anyhow::Result<()> {
    tracing::info!("--- Starting peek ---");

    let elevated = peek_capture::is_elevated();
    if elevated {
        tracing::info!("Running with elevated privileges");
    } else {
        tracing::warn!("Not running elevated; global hotkeys may fail on some systems");
    }

    if config.vision.api_key.is_empty() && !config.vision.endpoint.contains("key=") {
        tracing::warn!("No API key configured (GEMINI_API_KEY), requests will likely fail with 400/403");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("peek-worker")
        .build()
        .context("Failed to build tokio runtime")?;

    // Hotkeys must be registered on the thread that runs the UI event loop
    let mut hotkeys = HotkeyRegistry::new().map_err(|e| with_elevation_hint(e, elevated))?;
    let registered = hotkeys
        .register(&config.hotkeys.capture, HotkeyAction::Capture)
        .and_then(|_| hotkeys.register(&config.hotkeys.exit, HotkeyAction::Exit));
    if let Err(e) = registered {
        hotkeys.unregister_all();
        return Err(with_elevation_hint(e, elevated));
    }

    let vision: Arc<dyn VisionClient> =
        Arc::new(GeminiClient::new(&config.vision).context("Failed to build HTTP client")?);
    let metadata = vision.metadata();
    tracing::info!(
        "Vision provider: {} ({}) at {}",
        metadata.name,
        metadata.model,
        metadata.endpoint
    );

    let controller = AppController::new(
        Arc::new(ScreenCapturer::new(&config.capture)),
        vision,
        config.overlay.processing_text.clone(),
    );

    let mut tasks = {
        let _guard = runtime.enter();
        controller.spawn_tasks(hotkeys.actions())
    };

    tracing::info!(
        "App running. Press '{}' to capture screen, '{}' to quit.",
        config.hotkeys.capture,
        config.hotkeys.exit
    );

    let ui_result = peek_ui::run_overlay(controller.ui_receiver(), config.overlay.clone());
    if let Err(e) = &ui_result {
        tracing::error!("Overlay failed: {:#}", e);
    }

    tracing::info!("Initiating shutdown...");
    hotkeys.unregister_all();
    controller.shutdown();

    runtime.block_on(async {
        let drained = tokio::time::timeout(Duration::from_secs(2), async {
            while let Some(result) = tasks.join_next().await {
                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => tracing::warn!("Task exited with error: {:#}", e),
                    Err(e) => tracing::error!("Task panicked: {}", e),
                }
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!("Tasks still running after shutdown, aborting");
            tasks.shutdown().await;
        }
    });

    // An in-flight request is abandoned here
    runtime.shutdown_timeout(Duration::from_secs(1));
    tracing::info!("--- peek exited ---");

    ui_result
}
