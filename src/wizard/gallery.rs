// Gallery - carousel over the original photo and its variations

use super::data_url;
use super::types::{UploadedImage, Variations};
use std::path::{Path, PathBuf};
use tracing::info;

/// Keys that can activate a focused thumbnail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationKey {
    Enter,
    Space,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryEntry {
    pub data_url: String,
    /// Prompt behind a variation, `None` for the original
    pub prompt: Option<String>,
}

/// Selection cursor over `[original, ...variations]`
#[derive(Debug, Clone)]
pub struct Gallery {
    entries: Vec<GalleryEntry>,
    selected: usize,
}

// Always holds at least the original
#[allow(clippy::len_without_is_empty)]
impl Gallery {
    pub fn new(original: &UploadedImage, variations: &Variations) -> Self {
        let generated = variations
            .iter()
            .map(|img| GalleryEntry {
                data_url: img.data_url.clone(),
                prompt: Some(img.prompt.clone()),
            })
            .collect();
        Self::from_parts(&original.data_url, generated)
    }

    /// Starts on the first variation when there is one
    pub fn from_parts(original: &str, generated: Vec<GalleryEntry>) -> Self {
        let selected = if generated.is_empty() { 0 } else { 1 };
        let mut entries = Vec::with_capacity(generated.len() + 1);
        entries.push(GalleryEntry {
            data_url: original.to_string(),
            prompt: None,
        });
        entries.extend(generated);

        Self { entries, selected }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_entry(&self) -> &GalleryEntry {
        &self.entries[self.selected]
    }

    pub fn next(&mut self) -> usize {
        self.selected = if self.selected + 1 == self.entries.len() {
            0
        } else {
            self.selected + 1
        };
        self.selected
    }

    pub fn previous(&mut self) -> usize {
        self.selected = if self.selected == 0 {
            self.entries.len() - 1
        } else {
            self.selected - 1
        };
        self.selected
    }

    /// Direct thumbnail selection; out-of-range indices are ignored
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.selected = index;
            true
        } else {
            false
        }
    }

    /// Keyboard activation of a thumbnail, only Enter and Space select
    pub fn activate(&mut self, index: usize, key: ActivationKey) -> bool {
        match key {
            ActivationKey::Enter | ActivationKey::Space => self.select(index),
            ActivationKey::Other => false,
        }
    }

    pub fn label(index: usize) -> String {
        if index == 0 {
            "ORIGINAL".to_string()
        } else {
            format!("Variation {}", index)
        }
    }

    pub fn file_name(index: usize) -> String {
        if index == 0 {
            "original_image.png".to_string()
        } else {
            format!("generated_image_{}.png", index)
        }
    }

    /// Write the selected image into `dir`
    pub async fn download(&self, dir: &Path) -> Result<PathBuf, GalleryError> {
        let bytes = data_url::decode(&self.selected_entry().data_url)
            .map_err(|e| GalleryError::Decode(e.to_string()))?;

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| GalleryError::Io(format!("Failed to create {}: {}", dir.display(), e)))?;

        let path = dir.join(Self::file_name(self.selected));
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| GalleryError::Io(format!("Failed to write {}: {}", path.display(), e)))?;

        info!(path = %path.display(), bytes = bytes.len(), "image downloaded");
        Ok(path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    #[error("Image data is unreadable: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::types::GeneratedImage;

    fn gallery(generated: usize) -> Gallery {
        let entries = (1..=generated)
            .map(|i| GalleryEntry {
                data_url: data_url::encode("image/png", format!("variation {}", i).as_bytes()),
                prompt: Some(format!("prompt {}", i)),
            })
            .collect();
        Gallery::from_parts(&data_url::encode("image/png", b"original"), entries)
    }

    #[test]
    fn test_initial_selection() {
        assert_eq!(gallery(3).selected(), 1);
        assert_eq!(gallery(0).selected(), 0);
    }

    #[test]
    fn test_navigation_wraps_both_ends() {
        let mut g = gallery(3);
        assert_eq!(g.len(), 4);

        g.select(3);
        assert_eq!(g.next(), 0);
        assert_eq!(g.previous(), 3);
        assert_eq!(g.previous(), 2);
    }

    #[test]
    fn test_single_entry_navigation() {
        let mut g = gallery(0);
        assert_eq!(g.next(), 0);
        assert_eq!(g.previous(), 0);
    }

    #[test]
    fn test_select_and_activate() {
        let mut g = gallery(2);
        assert!(!g.select(5));
        assert_eq!(g.selected(), 1);

        assert!(!g.activate(0, ActivationKey::Other));
        assert_eq!(g.selected(), 1);
        assert!(g.activate(0, ActivationKey::Enter));
        assert_eq!(g.selected(), 0);
        assert!(g.activate(2, ActivationKey::Space));
        assert_eq!(g.selected_entry().prompt.as_deref(), Some("prompt 2"));
    }

    #[test]
    fn test_file_names_and_labels() {
        assert_eq!(Gallery::file_name(0), "original_image.png");
        assert_eq!(Gallery::file_name(3), "generated_image_3.png");
        assert_eq!(Gallery::label(0), "ORIGINAL");
        assert_eq!(Gallery::label(2), "Variation 2");
    }

    #[test]
    fn test_built_from_variations() {
        let original = UploadedImage {
            data_url: "data:image/png;base64,AAAA".to_string(),
            mime_type: "image/png".to_string(),
            width: 1,
            height: 1,
            file_name: "me.png".to_string(),
        };
        let variations = Variations::new(vec![
            GeneratedImage::new("data:image/png;base64,BBBB", "a"),
            GeneratedImage::new("data:image/png;base64,CCCC", "b"),
        ])
        .unwrap();

        let g = Gallery::new(&original, &variations);
        assert_eq!(g.len(), 3);
        assert_eq!(g.entries()[0].prompt, None);
        assert_eq!(g.selected_entry().data_url, "data:image/png;base64,BBBB");
    }

    #[tokio::test]
    async fn test_download_writes_selected_image() {
        let dir = std::env::temp_dir().join(format!("studio-gallery-{}", std::process::id()));
        let mut g = gallery(2);

        let path = g.download(&dir).await.unwrap();
        assert_eq!(path, dir.join("generated_image_1.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"variation 1");

        g.select(0);
        let path = g.download(&dir).await.unwrap();
        assert_eq!(path, dir.join("original_image.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"original");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_download_rejects_bad_data() {
        let g = Gallery::from_parts("not a data url", Vec::new());
        let dir = std::env::temp_dir();
        assert!(matches!(g.download(&dir).await, Err(GalleryError::Decode(_))));
    }
}
