use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use kanal::AsyncSender;
use peek_capture::ScreenshotSource;
use peek_types::AppEvent;
use peek_vision::{VisionClient, VisionError};
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

pub const ERROR_PREFIX: &str = "Error: ";

/// Everything that can end a capture cycle early
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("Screen capture unavailable: {0}\nCheck that this process may record the screen.")]
    CaptureUnavailable(String),

    #[error(transparent)]
    Vision(#[from] VisionError),

    #[error("Unexpected failure: {0}")]
    Unknown(String),
}

impl CycleError {
    pub fn display_text(&self) -> String {
        format!("{ERROR_PREFIX}{self}")
    }
}

/// Clears the in-flight flag when the cycle task ends, however it ends
struct ProcessingGuard(Arc<AtomicBool>);

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Runs capture -> vision -> display, one cycle at a time
///
/// Triggers that arrive while a cycle is in flight are dropped, not queued.
/// All display updates go through `display_tx` to the UI thread.
pub struct CaptureCoordinator {
    processing: Arc<AtomicBool>,
    screenshots: Arc<dyn ScreenshotSource>,
    vision: Arc<dyn VisionClient>,
    display_tx: AsyncSender<AppEvent>,
    processing_text: String,
}

impl CaptureCoordinator {
    pub fn new(
        screenshots: Arc<dyn ScreenshotSource>,
        vision: Arc<dyn VisionClient>,
        display_tx: AsyncSender<AppEvent>,
        processing_text: String,
    ) -> Self {
        Self {
            processing: Arc::new(AtomicBool::new(false)),
            screenshots,
            vision,
            display_tx,
            processing_text,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    /// Start a cycle unless one is running
    ///
    /// Returns the cycle's task, or `None` when the trigger was dropped.
    pub async fn on_hotkey_triggered(&self) -> Option<JoinHandle<()>> {
        if self
            .processing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::info!("Request already in progress, ignoring trigger");
            return None;
        }
        let guard = ProcessingGuard(self.processing.clone());

        let cycle_id = Uuid::new_v4();
        let span = tracing::info_span!("cycle", id = %cycle_id);
        span.in_scope(|| tracing::info!("Capture triggered"));

        if self
            .display_tx
            .send(AppEvent::Display(self.processing_text.clone()))
            .await
            .is_err()
        {
            tracing::warn!("UI channel closed, placeholder not shown");
        }

        let screenshots = self.screenshots.clone();
        let vision = self.vision.clone();
        let display_tx = self.display_tx.clone();

        let cycle = async move {
            let _guard = guard;

            // Inner task so a panic anywhere in the cycle surfaces as a JoinError
            let outcome = tokio::spawn(run_cycle(screenshots, vision).in_current_span()).await;

            let text = match outcome {
                Ok(Ok(answer)) => {
                    tracing::info!("Cycle finished with {} chars", answer.len());
                    answer
                }
                Ok(Err(e)) => {
                    tracing::error!("Cycle failed: {}", e);
                    e.display_text()
                }
                Err(e) => {
                    let err = CycleError::Unknown(join_error_message(e));
                    tracing::error!("Cycle task died: {}", err);
                    err.display_text()
                }
            };

            if display_tx.send(AppEvent::Display(text)).await.is_err() {
                tracing::warn!("UI channel closed, result not shown");
            }
        };

        Some(tokio::spawn(cycle.instrument(span)))
    }
}

async fn run_cycle(
    screenshots: Arc<dyn ScreenshotSource>,
    vision: Arc<dyn VisionClient>,
) -> Result<String, CycleError> {
    let png = tokio::task::spawn_blocking(move || screenshots.capture_png())
        .await
        .map_err(|e| CycleError::Unknown(join_error_message(e)))?
        .map_err(|e| CycleError::CaptureUnavailable(format!("{e:#}")))?;

    tracing::info!("Screenshot captured ({} bytes PNG)", png.len());

    let answer = vision.analyze(&png).await?;
    if answer.is_empty() {
        tracing::warn!("Vision API answered with empty text");
    }

    Ok(answer)
}

fn join_error_message(e: tokio::task::JoinError) -> String {
    if e.is_cancelled() {
        return "cycle task was cancelled".to_string();
    }
    panic_message(e.into_panic())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
