use std::env;

use serde::{Deserialize, Serialize};

use self::capture::CaptureConfig;
use self::hotkey::HotkeyConfig;
use self::overlay::OverlayConfig;
use self::vision::VisionConfig;

pub mod capture;
pub mod hotkey;
pub mod overlay;
pub mod vision;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hotkeys: HotkeyConfig,
    pub vision: VisionConfig,
    pub overlay: OverlayConfig,
    pub capture: CaptureConfig,
}

impl Config {
    /// Environment wins over whatever was loaded from a profile
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(endpoint) = env::var("PEEK_API_ENDPOINT") {
            self.vision.endpoint = endpoint;
        }

        if let Ok(key) = env::var("GEMINI_API_KEY") {
            self.vision.api_key = key;
        }

        if let Some(timeout) = env::var("PEEK_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.vision.timeout_seconds = timeout;
        }

        if let Ok(capture) = env::var("PEEK_HOTKEY_CAPTURE") {
            self.hotkeys.capture = capture;
        }

        if let Ok(exit) = env::var("PEEK_HOTKEY_EXIT") {
            self.hotkeys.exit = exit;
        }

        self
    }
}
