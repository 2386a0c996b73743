mod error;
mod gemini;
pub mod wire;

pub use error::VisionError;
pub use gemini::GeminiClient;

/// Vision-language provider interface
#[async_trait::async_trait]
pub trait VisionClient: Send + Sync {
    /// Send one PNG screenshot and return the model's answer
    async fn analyze(&self, png: &[u8]) -> Result<String, VisionError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
    pub model: String,
    pub endpoint: String,
}
