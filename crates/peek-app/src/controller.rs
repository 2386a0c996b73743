use std::collections::HashMap;
use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use peek_capture::ScreenshotSource;
use peek_types::{AppEvent, HotkeyAction};
use peek_vision::VisionClient;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::coordinator::CaptureCoordinator;
use crate::events::event_loop;

/// Centralized channel management
pub struct ChannelSet {
    /// Hotkeys and signals into the app loop
    pub app_events: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    /// Display updates and shutdown out to the UI thread
    pub ui_events: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_events: kanal::bounded_async(64),
            ui_events: kanal::bounded_async(256),
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    coordinator: Arc<CaptureCoordinator>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(
        screenshots: Arc<dyn ScreenshotSource>,
        vision: Arc<dyn VisionClient>,
        processing_text: String,
    ) -> Self {
        let channels = ChannelSet::new();
        let coordinator = Arc::new(CaptureCoordinator::new(
            screenshots,
            vision,
            channels.ui_events.0.clone(),
            processing_text,
        ));

        Self {
            channels,
            coordinator,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Must be called inside the tokio runtime
    pub fn spawn_tasks(&self, hotkeys: HashMap<u32, HotkeyAction>) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Event loop
        tasks.spawn(event_loop(
            self.coordinator.clone(),
            self.channels.app_events.1.clone(),
            self.channels.ui_events.0.clone(),
            self.cancel_token.clone(),
        ));

        // Hotkey listener
        let cancel = self.cancel_token.child_token();
        let tx = self.channels.app_events.0.as_sync().clone();
        tasks.spawn_blocking(move || {
            peek_capture::listen_hotkeys(hotkeys, cancel, tx);
            Ok(())
        });

        // Ctrl+C takes the same path as the exit hotkey
        let cancel = self.cancel_token.child_token();
        let tx = self.channels.app_events.0.clone();
        tasks.spawn(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    result?;
                    tracing::info!("Ctrl+C received");
                    tx.send(AppEvent::Shutdown).await?;
                }
                _ = cancel.cancelled() => {}
            }
            Ok(())
        });

        tasks
    }

    pub fn ui_receiver(&self) -> AsyncReceiver<AppEvent> {
        self.channels.ui_events.1.clone()
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
