//! Error types for Elga

use thiserror::Error;

/// The main error type for Elga operations
#[derive(Debug, Error)]
pub enum ElgaError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("JSON error: {0}")]
    JsonError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Message bundle error ({locale}): {detail}")]
    BundleError { locale: String, detail: String },

    #[error("Missing credential for provider '{provider}': set {env_var}")]
    MissingCredential { provider: String, env_var: String },

    #[error("Unknown provider '{name}'. Available: {available}")]
    UnknownProvider { name: String, available: String },

    #[error("Invalid job list: {0}")]
    InvalidJobList(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Provider returned no image for '{0}'")]
    EmptyPayload(String),

    #[error("Failed to decode image payload: {0}")]
    DecodeError(String),
}

impl ElgaError {
    /// Whether this error means no job in a batch could succeed
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ElgaError::ConfigError(_)
                | ElgaError::MissingCredential { .. }
                | ElgaError::UnknownProvider { .. }
                | ElgaError::InvalidJobList(_)
                | ElgaError::TomlParseError(_)
        )
    }
}

/// Result type alias for Elga operations
pub type Result<T> = std::result::Result<T, ElgaError>;

impl From<toml::de::Error> for ElgaError {
    fn from(err: toml::de::Error) -> Self {
        ElgaError::TomlParseError(err.to_string())
    }
}

impl From<serde_json::Error> for ElgaError {
    fn from(err: serde_json::Error) -> Self {
        ElgaError::JsonError(err.to_string())
    }
}
