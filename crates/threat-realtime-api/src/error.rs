//! # API Error Types
//!
//! Error handling for the real-time gateway.

use thiserror::Error;
use threat_domain::DomainError;

/// Gateway-level errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid message: {0}")]
    InvalidMessage(#[from] serde_json::Error),

    #[error("Invalid position: {0}")]
    InvalidPosition(#[from] DomainError),

    #[error("Unsupported channel: {0}")]
    UnsupportedChannel(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Stable error code reported to clients
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidMessage(_) => "INVALID_MESSAGE",
            Self::InvalidPosition(_) => "INVALID_POSITION",
            Self::UnsupportedChannel(_) => "UNSUPPORTED_CHANNEL",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }
}

/// Result type alias for gateway operations
pub type ApiResult<T> = Result<T, ApiError>;
