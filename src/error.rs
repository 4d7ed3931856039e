// SPDX-License-Identifier: GPL-3.0-only
//! Error types for the application
//!
//! Transport failures arrive as `anyhow::Error` from the protocol layer and
//! are wrapped here with the monitor they concern. Every `AppError` that
//! reaches `main` is reported through the envelope's `message` field.

use std::path::PathBuf;

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Opening a session on a monitor failed
    #[error("Failed to open monitor {index}: {source}")]
    SessionOpen {
        index: usize,
        #[source]
        source: anyhow::Error,
    },

    /// A VCP write was rejected by the monitor or the transport
    #[error("DDC/CI write of VCP {code:#04x} on monitor {index} failed: {source}")]
    Transport {
        index: usize,
        code: u8,
        #[source]
        source: anyhow::Error,
    },

    /// Malformed command-line argument
    #[error("invalid value '{value}' for <{name}>: {reason}")]
    InvalidArgument {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Configuration file could not be used
    #[error("Configuration error in {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    /// Result serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_open_message_keeps_cause() {
        let err = AppError::SessionOpen {
            index: 2,
            source: anyhow::anyhow!("no such device"),
        };
        assert_eq!(err.to_string(), "Failed to open monitor 2: no such device");
    }

    #[test]
    fn test_transport_message_formats_code_as_hex() {
        let err = AppError::Transport {
            index: 0,
            code: 0x10,
            source: anyhow::anyhow!("NACK"),
        };
        assert_eq!(
            err.to_string(),
            "DDC/CI write of VCP 0x10 on monitor 0 failed: NACK"
        );
    }
}
