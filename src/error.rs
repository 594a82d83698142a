use std::path::PathBuf;
use thiserror::Error;

/// Main error type for daily-report
#[derive(Error, Debug)]
pub enum ReportError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// HTTP/API errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Claude Messages API errors
    #[error("Claude API error: {0}")]
    Api(String),

    /// Credential environment variable not set
    #[error("Missing credential: environment variable {var} is not set")]
    MissingCredential { var: String },

    /// Agent runtime binary could not be started
    #[error("Agent runtime not found: {}", .binary.display())]
    AgentNotFound { binary: PathBuf },

    /// Agent runtime failures
    #[error("Agent error: {0}")]
    Agent(String),
}

/// Result type alias for daily-report operations
pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new Claude API error
    pub fn api<S: Into<String>>(msg: S) -> Self {
        Self::Api(msg.into())
    }

    /// Create a new agent runtime error
    pub fn agent<S: Into<String>>(msg: S) -> Self {
        Self::Agent(msg.into())
    }
}
