use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use peek_types::{AppEvent, HotkeyAction};
use tokio_util::sync::CancellationToken;

use crate::coordinator::CaptureCoordinator;

/// App's main loop
pub async fn event_loop(
    coordinator: Arc<CaptureCoordinator>,
    app_rx: AsyncReceiver<AppEvent>,
    ui_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    tracing::info!("[EVENT_LOOP] Waiting for events");

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = app_rx.recv() => event?,
        };

        match event {
            AppEvent::Hotkey(HotkeyAction::Capture) => {
                // The cycle runs detached; the loop only gates it
                coordinator.on_hotkey_triggered().await;
            }
            AppEvent::Hotkey(HotkeyAction::Exit) | AppEvent::Shutdown => {
                tracing::info!("[EVENT_LOOP] Shutdown requested");
                if ui_tx.send(AppEvent::Shutdown).await.is_err() {
                    tracing::debug!("[EVENT_LOOP] UI already gone");
                }
                cancel.cancel();
                break;
            }
            // Display updates go straight from the coordinator to the UI
            AppEvent::Display(_) => {
                tracing::debug!("[EVENT_LOOP] Ignoring display event on app channel");
            }
        }
    }

    tracing::info!("[EVENT_LOOP] Stopped");
    Ok(())
}
