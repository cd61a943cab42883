// Core types for the studio wizard

use serde::{Deserialize, Serialize};

/// Upper bound on edit requests issued for a preset style
pub const MAX_VARIATIONS: usize = 5;

/// A photo accepted by intake, immutable for the rest of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    /// `data:<mime>;base64,<payload>` reference to the original bytes
    pub data_url: String,
    /// Declared type, always `image/...`
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    /// File name the photo was loaded from, for display only
    pub file_name: String,
}

impl UploadedImage {
    /// Base64 payload of the data URL, without the header
    pub fn base64_payload(&self) -> &str {
        self.data_url
            .split_once(',')
            .map(|(_, payload)| payload)
            .unwrap_or_default()
    }
}

/// Style families the service can write prompts for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    Professional,
    Creative,
}

impl StylePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            StylePreset::Professional => "professional",
            StylePreset::Creative => "creative",
        }
    }
}

/// How the variations are requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationMode {
    Professional,
    Creative,
    /// Free-text instruction, never blank
    Custom(String),
}

impl GenerationMode {
    /// Build a custom mode; blank instructions are rejected, others are kept as typed
    pub fn custom(instruction: impl Into<String>) -> Option<Self> {
        let instruction = instruction.into();
        if instruction.trim().is_empty() {
            None
        } else {
            Some(GenerationMode::Custom(instruction))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Professional => "professional",
            GenerationMode::Creative => "creative",
            GenerationMode::Custom(_) => "custom",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GenerationMode::Professional => "Generate Professional Poses",
            GenerationMode::Creative => "Generate Creative Poses",
            GenerationMode::Custom(_) => "Custom Instructions",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GenerationMode::Professional => {
                "Create 5 polished headshots with business attire and clean corporate backgrounds."
            }
            GenerationMode::Creative => {
                "Create 5 varied, fun poses with new expressions, keeping your original clothing."
            }
            GenerationMode::Custom(_) => "Enter your own prompt to generate a custom image.",
        }
    }
}

/// One image returned by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub data_url: String,
    /// Instruction the image was produced from
    pub prompt: String,
}

impl GeneratedImage {
    pub fn new(data_url: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            data_url: data_url.into(),
            prompt: prompt.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data_url.trim().is_empty()
    }
}

/// Ordered, non-empty set of generated images
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variations(Vec<GeneratedImage>);

// Never empty, so there is no is_empty
#[allow(clippy::len_without_is_empty)]
impl Variations {
    /// Drop empty images; `None` if nothing usable is left
    pub fn new(images: Vec<GeneratedImage>) -> Option<Self> {
        let images: Vec<_> = images.into_iter().filter(|img| !img.is_empty()).collect();
        if images.is_empty() {
            None
        } else {
            Some(Self(images))
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn first(&self) -> &GeneratedImage {
        &self.0[0]
    }

    pub fn get(&self, index: usize) -> Option<&GeneratedImage> {
        self.0.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedImage> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[GeneratedImage] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_mode_rejects_blank_prompt() {
        assert_eq!(GenerationMode::custom(""), None);
        assert_eq!(GenerationMode::custom("   \n\t"), None);
        assert_eq!(
            GenerationMode::custom("  add a superhero cape "),
            Some(GenerationMode::Custom("  add a superhero cape ".to_string()))
        );
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(GenerationMode::Professional.as_str(), StylePreset::Professional.as_str());
        assert_eq!(GenerationMode::Creative.as_str(), StylePreset::Creative.as_str());
        assert_eq!(GenerationMode::Custom("x".into()).as_str(), "custom");
        assert!(!GenerationMode::Creative.description().is_empty());
    }

    #[test]
    fn test_variations_filter_empty_images() {
        assert!(Variations::new(vec![]).is_none());
        assert!(Variations::new(vec![GeneratedImage::new("", "a"), GeneratedImage::new(" ", "b")]).is_none());

        let variations = Variations::new(vec![
            GeneratedImage::new("", "a"),
            GeneratedImage::new("data:image/png;base64,AAAA", "b"),
        ])
        .unwrap();
        assert_eq!(variations.len(), 1);
        assert_eq!(variations.first().prompt, "b");
    }

    #[test]
    fn test_base64_payload() {
        let image = UploadedImage {
            data_url: "data:image/png;base64,iVBORw0".to_string(),
            mime_type: "image/png".to_string(),
            width: 1,
            height: 1,
            file_name: "me.png".to_string(),
        };
        assert_eq!(image.base64_payload(), "iVBORw0");
    }
}
