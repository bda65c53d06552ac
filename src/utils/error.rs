use thiserror::Error;

#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request for {path} returned HTTP {status}")]
    HttpStatus { path: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse failure: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

/// Coarse error class, used in log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Transport,
    Parse,
    Configuration,
    Data,
}

impl AtlasError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AtlasError::Transport(_) | AtlasError::HttpStatus { .. } | AtlasError::Io(_) => {
                ErrorCategory::Transport
            }
            AtlasError::Parse(_) => ErrorCategory::Parse,
            AtlasError::Config { .. }
            | AtlasError::InvalidConfigValue { .. }
            | AtlasError::MissingConfig { .. } => ErrorCategory::Configuration,
            AtlasError::Validation { .. } => ErrorCategory::Data,
        }
    }
}

pub type Result<T> = std::result::Result<T, AtlasError>;
