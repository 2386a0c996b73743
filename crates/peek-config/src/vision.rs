use serde::{Deserialize, Serialize};

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        .to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_prompt() -> String {
    "Analyze this screenshot and provide a solution to the potential LeetCode problem shown. \
     If it's not a LeetCode problem, describe the content."
        .to_string()
}

fn default_max_output_tokens() -> u32 {
    800
}

fn default_temperature() -> f32 {
    0.4
}

fn default_timeout_seconds() -> u64 {
    45
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Full `generateContent` URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Sent as `x-goog-api-key` when not empty
    #[serde(default)]
    pub api_key: String,
    /// Only used for logging, the model is part of the endpoint
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            model: default_model(),
            prompt: default_prompt(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}
