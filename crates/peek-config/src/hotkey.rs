use serde::{Deserialize, Serialize};

fn default_capture() -> String {
    "ctrl+alt+s".to_string()
}

fn default_exit() -> String {
    "ctrl+alt+x".to_string()
}

/// Global key combinations, in `global-hotkey` string syntax
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    #[serde(default = "default_capture")]
    pub capture: String,
    #[serde(default = "default_exit")]
    pub exit: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            capture: default_capture(),
            exit: default_exit(),
        }
    }
}
