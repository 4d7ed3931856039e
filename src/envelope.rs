// SPDX-License-Identifier: GPL-3.0-only
//! The single JSON object printed per invocation

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Printed when even the envelope cannot be serialized
const FALLBACK_LINE: &str = r#"{"status":"error","data":null}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub status: Status,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Envelope {
    pub fn success<T: Serialize>(data: T) -> Result<Self> {
        Ok(Self {
            status: Status::Success,
            data: serde_json::to_value(data)?,
            message: None,
        })
    }

    /// Error envelope for an invocation that matched no command
    pub fn unrecognized() -> Self {
        Self {
            status: Status::Error,
            data: Value::Null,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::unrecognized()
        }
    }

    /// One line of JSON, without the trailing newline
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            error!("Failed to serialize result envelope: {e}");
            FALLBACK_LINE.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_line() {
        let envelope = Envelope::success(true).unwrap();
        assert_eq!(envelope.to_line(), r#"{"status":"success","data":true}"#);
    }

    #[test]
    fn test_unrecognized_line_has_no_message() {
        assert_eq!(Envelope::unrecognized().to_line(), FALLBACK_LINE);
    }

    #[test]
    fn test_error_line_carries_message() {
        assert_eq!(
            Envelope::error("boom").to_line(),
            r#"{"status":"error","data":null,"message":"boom"}"#
        );
    }
}
