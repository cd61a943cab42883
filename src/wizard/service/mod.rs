// External image service - the seam between the wizard and the generative backend

mod gemini;

pub use gemini::GeminiService;

use super::types::{GeneratedImage, StylePreset, UploadedImage};
use async_trait::async_trait;

/// Base trait for generative backends
#[async_trait]
pub trait ImageService: Send + Sync {
    /// Write a list of style prompts for the given preset
    async fn generate_prompts(&self, preset: StylePreset) -> Result<Vec<String>, ServiceError>;

    /// Transform the photo per the instruction.
    ///
    /// `Ok(None)` means the backend answered without an image, which is how
    /// safety blocks surface.
    async fn edit_image(
        &self,
        image: &UploadedImage,
        instruction: &str,
    ) -> Result<Option<GeneratedImage>, ServiceError>;

    /// Short backend name for status lines
    fn name(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
