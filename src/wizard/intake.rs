// Image intake - validates, encodes and measures a local photo

use super::data_url;
use super::types::UploadedImage;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Types offered by the file picker
pub const ACCEPTED_TYPES: &[&str] = &["image/*", "image/heic", "image/heif"];

/// Alert shown when a non-image file is supplied
pub const INVALID_FILE_MESSAGE: &str = "Please upload a valid image file.";

/// Declared MIME type of a file, derived from its extension
pub fn declared_mime_type(path: &Path) -> &'static str {
    let Some(ext) = path.extension() else {
        return "application/octet-stream";
    };

    match ext.to_string_lossy().to_lowercase().as_str() {
        // Images
        "jpg" | "jpeg" | "jfif" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "svg" => "image/svg+xml",

        // Common non-image drops
        "txt" | "md" => "text/plain",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "zip" => "application/zip",

        _ => "application/octet-stream",
    }
}

/// Only the category prefix is checked
pub fn is_accepted(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

/// Turns local files into `UploadedImage` values
pub struct Intake {}

impl Intake {
    pub fn new() -> Self {
        Self {}
    }

    /// Validate the declared type, then read and measure the file
    pub async fn load_file(&self, path: impl AsRef<Path>) -> Result<UploadedImage, IntakeError> {
        let path = path.as_ref();
        let mime_type = declared_mime_type(path);

        // Reject before touching the file
        if !is_accepted(mime_type) {
            debug!(path = %path.display(), mime_type, "rejected non-image file");
            return Err(IntakeError::InvalidFileType(mime_type.to_string()));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| IntakeError::Io(format!("{}: {}", path.display(), e)))?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("photo")
            .to_string();

        self.load_bytes(bytes, mime_type, file_name).await
    }

    /// Encode and measure raw bytes with a known declared type
    pub async fn load_bytes(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        file_name: impl Into<String>,
    ) -> Result<UploadedImage, IntakeError> {
        if !is_accepted(mime_type) {
            return Err(IntakeError::InvalidFileType(mime_type.to_string()));
        }

        let mime_type = mime_type.to_string();
        let file_name = file_name.into();

        // Both the encoding and the dimensions must be ready before the image is handed out
        let declared = mime_type.clone();
        let (data_url, dimensions) = tokio::task::spawn_blocking(move || {
            (data_url::encode(&declared, &bytes), measure(&bytes))
        })
        .await
        .map_err(|e| IntakeError::Decode(format!("Decode task failed: {}", e)))?;

        let (width, height) = dimensions?;

        info!(file = %file_name, width, height, mime_type = %mime_type, "photo accepted");

        Ok(UploadedImage {
            data_url,
            mime_type,
            width,
            height,
            file_name,
        })
    }
}

impl Default for Intake {
    fn default() -> Self {
        Self::new()
    }
}

/// Read pixel dimensions from the image header
fn measure(bytes: &[u8]) -> Result<(u32, u32), IntakeError> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| IntakeError::Decode(e.to_string()))?
        .into_dimensions()
        .map_err(|e| IntakeError::Decode(e.to_string()))
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Not an image file (declared type: {0})")]
    InvalidFileType(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Could not decode image: {0}")]
    Decode(String),
}

impl IntakeError {
    /// Text for the blocking alert
    pub fn user_message(&self) -> String {
        match self {
            IntakeError::InvalidFileType(_) => INVALID_FILE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}
