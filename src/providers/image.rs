use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;

/// A product image attached to a generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// MIME type, e.g. `image/jpeg`
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageData {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        ImageData {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Reads an image file
    ///
    /// # Arguments
    /// * `path` - Path to the image file; the MIME type is guessed from its extension
    ///
    /// # Errors
    /// Returns an error if the file cannot be read
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        Ok(ImageData::new(mime_for_path(path), bytes))
    }

    /// Image bytes as standard base64
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:` URL for APIs that take images inline as URLs
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}
