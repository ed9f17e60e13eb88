use base64::{engine::general_purpose, Engine as _};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("unsupported URL format: {0}")]
    UnsupportedUrl(String),

    #[error("file does not exist: {0}")]
    MissingFile(String),

    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

/// Encode a local `file://` image into a base64 `data:` URI for the
/// multimodal content array. Remote URLs are not fetched here.
pub fn encode_image_data_uri(url: &str) -> Result<String, EncodeError> {
    let Some(path) = url.strip_prefix("file://") else {
        return Err(EncodeError::UnsupportedUrl(url.to_string()));
    };
    if !Path::new(path).exists() {
        return Err(EncodeError::MissingFile(url.to_string()));
    }
    let bytes = std::fs::read(path)?;
    let encoded = general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:image/*;base64,{encoded}"))
}
