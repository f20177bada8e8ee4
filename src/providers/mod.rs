mod anthropic;
mod factory;
mod fallback;
mod google;
mod image;
mod open_ai;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use fallback::FallbackProvider;
pub use google::GoogleProvider;
pub use image::ImageData;
pub use open_ai::OpenAIProvider;

use async_trait::async_trait;
use std::error::Error;

pub type ProviderError = Box<dyn Error + Send + Sync>;

/// Unified trait for all generation providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "anthropic")
    fn provider_name(&self) -> &str;

    /// Generate the review text for a composed prompt and its product images
    async fn generate(&self, prompt: &str, images: &[ImageData]) -> Result<String, ProviderError>;
}
