mod capture;
mod hotkey;
mod privilege;

pub use capture::{
    Bounds, ScreenCapturer, ScreenshotSource, bounding_box, capture_all_screens,
    capture_primary_screen, capture_screen_region, encode_png, monitor_at,
};
pub use hotkey::{HotkeyRegistry, listen_hotkeys, parse_hotkey};
pub use privilege::is_elevated;
