//! Manual capture check - run with: cargo run -p peek-capture --bin capture_probe

use anyhow::Result;
use peek_capture::ScreenshotSource;
use peek_config::capture::{CaptureConfig, CaptureTarget};

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("debug").init();

    tracing::info!("Elevated: {}", peek_capture::is_elevated());

    for (target, file) in [
        (CaptureTarget::Primary, "probe_primary.png"),
        (CaptureTarget::All, "probe_all.png"),
    ] {
        let capturer = peek_capture::ScreenCapturer::new(&CaptureConfig {
            target,
            region: None,
        });

        let start = std::time::Instant::now();
        match capturer.capture_png() {
            Ok(png) => {
                tracing::info!("{:?}: {} bytes in {:?}", target, png.len(), start.elapsed());
                std::fs::write(file, &png)?;
                tracing::info!("Saved to {}", file);
            }
            Err(e) => tracing::error!("{:?} failed: {:#}", target, e),
        }
    }

    Ok(())
}
