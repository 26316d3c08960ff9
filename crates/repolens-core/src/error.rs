//! Centralized error types for repolens.

use thiserror::Error;

/// Main error type for repolens operations.
#[derive(Error, Debug)]
pub enum LensError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed backend response: {0}")]
    Decode(String),

    #[error("Analysis not ready after {attempts} attempt(s)")]
    TimedOut { attempts: u32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for repolens operations.
pub type LensResult<T> = Result<T, LensError>;

impl LensError {
    /// Create a transport error for a request to `url`.
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}
