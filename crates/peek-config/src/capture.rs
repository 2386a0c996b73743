use peek_types::CaptureRegion;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureTarget {
    #[default]
    Primary,
    /// Every monitor composited into one image
    All,
    /// `CaptureConfig::region`, falls back to primary when unset
    Region,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub target: CaptureTarget,
    pub region: Option<CaptureRegion>,
}
