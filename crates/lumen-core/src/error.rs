//! Error types for Lumen

use thiserror::Error;

/// The main error type for Lumen operations
#[derive(Debug, Error)]
pub enum LumenError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Image error: {0}")]
    Image(String),
}

/// Result type alias for Lumen operations
pub type Result<T> = std::result::Result<T, LumenError>;

impl From<toml::de::Error> for LumenError {
    fn from(err: toml::de::Error) -> Self {
        LumenError::TomlParse(err.to_string())
    }
}
