use peek_config::overlay::CaptureProtection;

/// Keeps the overlay out of other applications' screen captures
pub trait DisplayProtection {
    fn name(&self) -> &'static str;

    /// Apply to a window that is already shown (the native handle exists)
    fn protect(&self, window: &slint::Window) -> anyhow::Result<()>;
}

/// Used where the platform offers nothing, or protection is off
pub struct NoProtection;

impl DisplayProtection for NoProtection {
    fn name(&self) -> &'static str {
        "none"
    }

    fn protect(&self, _window: &slint::Window) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Pick the implementation once, at startup
pub fn select(mode: CaptureProtection) -> Box<dyn DisplayProtection> {
    match mode {
        CaptureProtection::None => Box::new(NoProtection),
        mode => platform(mode),
    }
}

#[cfg(windows)]
fn platform(mode: CaptureProtection) -> Box<dyn DisplayProtection> {
    Box::new(affinity::AffinityProtection::new(mode))
}

#[cfg(not(windows))]
fn platform(mode: CaptureProtection) -> Box<dyn DisplayProtection> {
    tracing::warn!(
        "Capture protection {:?} is not supported on this platform, overlay will appear in captures",
        mode
    );
    Box::new(NoProtection)
}

#[cfg(windows)]
mod affinity {
    use anyhow::{Context, bail};
    use peek_config::overlay::CaptureProtection;
    use raw_window_handle::{HasWindowHandle, RawWindowHandle};
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::WindowsAndMessaging::{
        SetWindowDisplayAffinity, WDA_EXCLUDEFROMCAPTURE, WDA_MONITOR, WINDOW_DISPLAY_AFFINITY,
    };

    use super::DisplayProtection;

    /// `SetWindowDisplayAffinity` on the overlay's HWND
    pub struct AffinityProtection {
        affinity: WINDOW_DISPLAY_AFFINITY,
    }

    impl AffinityProtection {
        pub fn new(mode: CaptureProtection) -> Self {
            let affinity = match mode {
                CaptureProtection::Exclude => WDA_EXCLUDEFROMCAPTURE,
                _ => WDA_MONITOR,
            };
            Self { affinity }
        }
    }

    impl DisplayProtection for AffinityProtection {
        fn name(&self) -> &'static str {
            if self.affinity == WDA_EXCLUDEFROMCAPTURE {
                "exclude-from-capture"
            } else {
                "monitor-only"
            }
        }

        fn protect(&self, window: &slint::Window) -> anyhow::Result<()> {
            let handle = window.window_handle();
            let raw = handle
                .window_handle()
                .map_err(|e| anyhow::anyhow!("No native window handle: {e}"))?
                .as_raw();

            let RawWindowHandle::Win32(win32) = raw else {
                bail!("Unexpected window handle kind");
            };

            let hwnd = HWND(win32.hwnd.get() as *mut _);
            unsafe { SetWindowDisplayAffinity(hwnd, self.affinity) }
                .context("SetWindowDisplayAffinity failed")?;

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_selects_no_protection() {
        assert_eq!(select(CaptureProtection::None).name(), "none");
    }

    #[cfg(not(windows))]
    #[test]
    fn unsupported_platform_falls_back_to_no_protection() {
        assert_eq!(select(CaptureProtection::Exclude).name(), "none");
        assert_eq!(select(CaptureProtection::Monitor).name(), "none");
    }
}
