use anyhow::{Context, Result, bail};
use peek_config::capture::{CaptureConfig, CaptureTarget};
use peek_types::CaptureRegion;
use xcap::Monitor;
use xcap::image::{RgbaImage, imageops};

/// Produces a PNG of the current display(s)
///
/// Implementations block; callers run them off the async runtime.
pub trait ScreenshotSource: Send + Sync {
    fn capture_png(&self) -> Result<Vec<u8>>;
}

/// xcap-backed source selected by `CaptureConfig`
#[derive(Debug, Clone)]
pub struct ScreenCapturer {
    target: CaptureTarget,
    region: Option<CaptureRegion>,
}

impl ScreenCapturer {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            target: config.target,
            region: config.region,
        }
    }
}

impl ScreenshotSource for ScreenCapturer {
    fn capture_png(&self) -> Result<Vec<u8>> {
        match (self.target, self.region) {
            (CaptureTarget::Primary, _) => capture_primary_screen(),
            (CaptureTarget::All, _) => capture_all_screens(),
            (CaptureTarget::Region, Some(region)) => capture_screen_region(region),
            (CaptureTarget::Region, None) => {
                tracing::warn!("Region capture configured without a region, using primary screen");
                capture_primary_screen()
            }
        }
    }
}

/// Screen-space rectangle of a monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    fn of(monitor: &Monitor) -> Self {
        Self {
            x: monitor.x(),
            y: monitor.y(),
            width: monitor.width(),
            height: monitor.height(),
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn contains(&self, region: &CaptureRegion) -> bool {
        region.x >= self.x
            && region.y >= self.y
            && region.x + region.width as i32 <= self.right()
            && region.y + region.height as i32 <= self.bottom()
    }
}

/// Smallest rectangle covering every monitor
pub fn bounding_box(monitors: &[Bounds]) -> Option<Bounds> {
    let left = monitors.iter().map(|b| b.x).min()?;
    let top = monitors.iter().map(|b| b.y).min()?;
    let right = monitors.iter().map(Bounds::right).max()?;
    let bottom = monitors.iter().map(Bounds::bottom).max()?;

    Some(Bounds {
        x: left,
        y: top,
        width: (right - left) as u32,
        height: (bottom - top) as u32,
    })
}

/// Bounds of the monitor under a screen point, else of the primary monitor
pub fn monitor_at(x: i32, y: i32) -> Result<Bounds> {
    let monitors = Monitor::all().context("Failed to get monitors")?;
    let bounds: Vec<(Bounds, bool)> = monitors
        .iter()
        .map(|m| (Bounds::of(m), m.is_primary()))
        .collect();

    bounds
        .iter()
        .find(|(b, _)| b.contains_point(x, y))
        .or_else(|| bounds.iter().find(|(_, primary)| *primary))
        .or(bounds.first())
        .map(|(b, _)| *b)
        .context("No monitor found")
}

/// Capture the primary monitor, or the first one if none is flagged primary
pub fn capture_primary_screen() -> Result<Vec<u8>> {
    let monitors = Monitor::all().context("Failed to get monitors")?;
    let monitor = monitors
        .iter()
        .find(|m| m.is_primary())
        .or(monitors.first())
        .context("No monitor found")?;

    let image = monitor.capture_image().context("Failed to capture screen")?;
    tracing::debug!("Captured primary screen {}x{}", image.width(), image.height());
    encode_png(&image)
}

/// Capture every monitor into one image laid out in screen space
pub fn capture_all_screens() -> Result<Vec<u8>> {
    let monitors = Monitor::all().context("Failed to get monitors")?;
    let bounds: Vec<Bounds> = monitors.iter().map(Bounds::of).collect();
    let canvas_bounds = bounding_box(&bounds).context("No monitor found")?;

    let mut canvas = RgbaImage::new(canvas_bounds.width, canvas_bounds.height);
    for (monitor, b) in monitors.iter().zip(&bounds) {
        let image = monitor
            .capture_image()
            .with_context(|| format!("Failed to capture monitor at ({}, {})", b.x, b.y))?;
        imageops::overlay(
            &mut canvas,
            &image,
            i64::from(b.x - canvas_bounds.x),
            i64::from(b.y - canvas_bounds.y),
        );
    }

    tracing::debug!(
        "Captured {} monitors into {}x{}",
        monitors.len(),
        canvas.width(),
        canvas.height()
    );
    encode_png(&canvas)
}

/// Capture a region of the screen
pub fn capture_screen_region(region: CaptureRegion) -> Result<Vec<u8>> {
    let monitors = Monitor::all().context("Failed to get monitors")?;

    let (monitor, bounds) = monitors
        .iter()
        .map(|m| (m, Bounds::of(m)))
        .find(|(_, b)| b.contains(&region))
        .with_context(|| format!("Capture region {region:?} is not inside any monitor"))?;

    let image = monitor.capture_image().context("Failed to capture screen")?;

    let cropped = imageops::crop_imm(
        &image,
        (region.x - bounds.x) as u32,
        (region.y - bounds.y) as u32,
        region.width,
        region.height,
    )
    .to_image();

    encode_png(&cropped)
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    use xcap::image::ImageEncoder;

    if image.width() == 0 || image.height() == 0 {
        bail!("Refusing to encode an empty {}x{} image", image.width(), image.height());
    }

    let mut buffer = Vec::new();
    xcap::image::codecs::png::PngEncoder::new(&mut buffer)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            xcap::image::ExtendedColorType::Rgba8,
        )
        .context("Failed to encode PNG")?;
    Ok(buffer)
}
