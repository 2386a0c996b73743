
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use peek_capture::ScreenshotSource;
use peek_types::AppEvent;
use peek_vision::{ProviderMetadata, VisionClient, VisionError};

/// Smallest byte string that still starts like a PNG
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

pub enum ScreenBehavior {
    Ok,
    Fail,
    Panic,
}

pub struct FakeScreen(pub ScreenBehavior);

impl ScreenshotSource for FakeScreen {
    fn capture_png(&self) -> anyhow::Result<Vec<u8>> {
        match self.0 {
            ScreenBehavior::Ok => Ok(FAKE_PNG.to_vec()),
            ScreenBehavior::Fail => anyhow::bail!("no monitors found"),
            ScreenBehavior::Panic => panic!("capture backend crashed"),
        }
    }
}

pub enum VisionBehavior {
    Answer(&'static str),
    RateLimited,
    Network,
    Panic,
}

pub struct FakeVision {
    behavior: VisionBehavior,
    delay: Duration,
    pub calls: AtomicUsize,
    active: AtomicUsize,
    pub max_active: AtomicUsize,
}

impl FakeVision {
    pub fn new(behavior: VisionBehavior) -> Self {
        Self {
            behavior,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait::async_trait]
impl VisionClient for FakeVision {
    async fn analyze(&self, png: &[u8]) -> Result<String, VisionError> {
        assert_eq!(png, FAKE_PNG);
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        match self.behavior {
            VisionBehavior::Answer(text) => Ok(text.to_string()),
            VisionBehavior::RateLimited => Err(VisionError::RateLimited),
            VisionBehavior::Network => Err(VisionError::Network("connection refused".into())),
            VisionBehavior::Panic => panic!("vision client crashed"),
        }
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "fake".into(),
            model: "fake-model".into(),
            endpoint: "http://localhost".into(),
        }
    }
}

pub fn screen(behavior: ScreenBehavior) -> Arc<FakeScreen> {
    Arc::new(FakeScreen(behavior))
}

/// Next display text, or panic after a second
pub async fn next_display(rx: &kanal::AsyncReceiver<AppEvent>) -> String {
    match tokio::time::timeout(Duration::from_secs(1), rx.recv()).await {
        Ok(Ok(AppEvent::Display(text))) => text,
        Ok(Ok(other)) => panic!("Expected display event, got {other:?}"),
        Ok(Err(e)) => panic!("Channel error: {e}"),
        Err(_) => panic!("Timeout waiting for display event"),
    }
}
