use crate::domain::error::{AppError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::PathBuf;

/// Where the bytes of an image live before they are read.
#[derive(Debug, Clone)]
pub enum BlobSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// A file-like binary blob with the content type its producer declared.
#[derive(Debug, Clone)]
pub struct ImageBlob {
    pub content_type: String,
    pub source: BlobSource,
}

impl ImageBlob {
    pub fn from_bytes(content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            source: BlobSource::Bytes(bytes),
        }
    }

    pub fn from_path(content_type: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            content_type: content_type.into(),
            source: BlobSource::Path(path.into()),
        }
    }
}

/// One entry of a clipboard paste event.
#[derive(Debug, Clone)]
pub struct ClipboardItem {
    pub kind: String,
    pub mime_type: String,
    pub data: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestedImage {
    pub mime_type: String,
    pub base64_payload: String,
    pub preview_url: String,
}

pub fn is_image_type(content_type: &str) -> bool {
    content_type.trim().starts_with("image/")
}

pub fn validate_image_type(content_type: &str) -> Result<()> {
    if is_image_type(content_type) {
        Ok(())
    } else {
        Err(AppError::InvalidType(format!(
            "expected an image, got '{}'",
            content_type
        )))
    }
}

/// Reads the whole blob and encodes it as `data:<type>;base64,<payload>`.
pub async fn read_data_url(blob: &ImageBlob) -> Result<String> {
    let encoded = match &blob.source {
        BlobSource::Bytes(bytes) => STANDARD.encode(bytes),
        BlobSource::Path(path) => {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                AppError::ReadError(format!("Failed to read {}: {}", path.display(), e))
            })?;
            STANDARD.encode(bytes)
        }
    };

    Ok(format!("data:{};base64,{}", blob.content_type.trim(), encoded))
}

/// Splits a data URL on its first comma into `(mime_type, payload)`.
pub fn parse_data_url(data_url: &str, fallback_mime: &str) -> Result<(String, String)> {
    let (header, payload) = data_url
        .split_once(',')
        .ok_or_else(|| AppError::MalformedDataUrl("Invalid image file format.".to_string()))?;

    if payload.is_empty() {
        return Err(AppError::MalformedDataUrl(
            "Invalid image file format.".to_string(),
        ));
    }

    let mime_type = header
        .split_once(':')
        .and_then(|(_, rest)| rest.split_once(';'))
        .map(|(mime, _)| mime.trim())
        .filter(|mime| !mime.is_empty())
        .unwrap_or(fallback_mime)
        .to_string();

    Ok((mime_type, payload.to_string()))
}

pub async fn ingest(blob: &ImageBlob) -> Result<IngestedImage> {
    validate_image_type(&blob.content_type)?;
    let preview_url = read_data_url(blob).await?;
    let (mime_type, base64_payload) = parse_data_url(&preview_url, &blob.content_type)?;

    Ok(IngestedImage {
        mime_type,
        base64_payload,
        preview_url,
    })
}

/// First file item with an image type. `Some` means the default paste must be suppressed.
pub fn select_clipboard_image(items: Vec<ClipboardItem>) -> Option<ImageBlob> {
    items
        .into_iter()
        .filter(|item| item.kind == "file" && is_image_type(&item.mime_type))
        .find_map(|item| {
            item.data
                .map(|bytes| ImageBlob::from_bytes(item.mime_type, bytes))
        })
}
