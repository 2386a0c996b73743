use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// A registered global hotkey fired
    Hotkey(HotkeyAction),
    /// Replace the overlay text, empty hides the overlay
    Display(String),
    /// Tear everything down. Sent to the app loop, then forwarded to the UI.
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyAction {
    Capture,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}
