use serde::{Deserialize, Serialize};

fn default_opacity() -> f32 {
    0.85
}

fn default_font_size() -> f32 {
    12.0
}

fn default_char_width() -> u32 {
    9
}

fn default_line_height() -> u32 {
    15
}

fn default_padding() -> u32 {
    10
}

fn default_min_width() -> u32 {
    150
}

fn default_min_height() -> u32 {
    50
}

fn default_max_width() -> u32 {
    900
}

fn default_max_height() -> u32 {
    700
}

fn default_background() -> String {
    "#222222".to_string()
}

fn default_foreground() -> String {
    "#E0E0E0".to_string()
}

fn default_move_step() -> i32 {
    20
}

fn default_processing_text() -> String {
    "Processing...".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Default for Position {
    fn default() -> Self {
        Self { x: 50, y: 50 }
    }
}

/// How the overlay hides itself from other applications' screen captures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureProtection {
    #[default]
    None,
    /// Visible on the physical monitor only, black in captures
    Monitor,
    /// Removed from captures entirely
    Exclude,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub position: Position,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Estimated glyph advance used for sizing, in pixels
    #[serde(default = "default_char_width")]
    pub char_width: u32,
    #[serde(default = "default_line_height")]
    pub line_height: u32,
    #[serde(default = "default_padding")]
    pub padding: u32,
    #[serde(default = "default_min_width")]
    pub min_width: u32,
    #[serde(default = "default_min_height")]
    pub min_height: u32,
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_foreground")]
    pub foreground: String,
    /// Slint renderer name (`femtovg`, `skia`, `software`), toolkit default when unset
    pub renderer: Option<String>,
    pub capture_protection: CaptureProtection,
    /// Pixels per Alt+Arrow press
    #[serde(default = "default_move_step")]
    pub move_step: i32,
    #[serde(default = "default_processing_text")]
    pub processing_text: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            position: Position::default(),
            opacity: default_opacity(),
            font_size: default_font_size(),
            char_width: default_char_width(),
            line_height: default_line_height(),
            padding: default_padding(),
            min_width: default_min_width(),
            min_height: default_min_height(),
            max_width: default_max_width(),
            max_height: default_max_height(),
            background: default_background(),
            foreground: default_foreground(),
            renderer: None,
            capture_protection: CaptureProtection::default(),
            move_step: default_move_step(),
            processing_text: default_processing_text(),
        }
    }
}
