use thiserror::Error;

/// Errors produced by model constructors and parsers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid media type {value:?}: {reason}")]
    InvalidMediaType { value: String, reason: &'static str },

    #[error("unsupported media type {0}")]
    UnsupportedMediaType(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
