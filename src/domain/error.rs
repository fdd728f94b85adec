use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    ValidationError(String),
    /// Declared content type is not `image/*`.
    InvalidType(String),
    /// Data URL has no payload segment after the first comma.
    MalformedDataUrl(String),
    /// The image blob could not be read into memory.
    ReadError(String),
    LLMError(String),
    ConfigError(String),
    SecurityError(String),
    IoError(String),
}

impl AppError {
    /// Message without the category prefix, suitable for user-facing banners.
    pub fn message(&self) -> &str {
        match self {
            AppError::Internal(msg)
            | AppError::ValidationError(msg)
            | AppError::InvalidType(msg)
            | AppError::MalformedDataUrl(msg)
            | AppError::ReadError(msg)
            | AppError::LLMError(msg)
            | AppError::ConfigError(msg)
            | AppError::SecurityError(msg)
            | AppError::IoError(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::InvalidType(msg) => write!(f, "Invalid file type: {}", msg),
            AppError::MalformedDataUrl(msg) => write!(f, "Malformed data URL: {}", msg),
            AppError::ReadError(msg) => write!(f, "Read error: {}", msg),
            AppError::LLMError(msg) => write!(f, "LLM error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            AppError::SecurityError(msg) => write!(f, "Security error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_strips_category_prefix() {
        let err = AppError::LLMError("Request failed: timeout".to_string());
        assert_eq!(err.message(), "Request failed: timeout");
        assert_eq!(err.to_string(), "LLM error: Request failed: timeout");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.png");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::IoError(ref msg) if msg.contains("missing.png")));
    }
}
