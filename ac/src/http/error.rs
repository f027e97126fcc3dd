//! HTTP error types

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure category, used for logging and the activity trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    NetworkUnreachable,
    Timeout,
    Request,
    ServerError,
    ValidationError,
    AuthExpired,
    Decode,
}

/// Errors that can occur during an API call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HttpError {
    #[error("Server unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Request could not be sent: {0}")]
    Request(String),

    #[error("Server error {status}: {}", .message.as_deref().unwrap_or("no message"))]
    ServerError { status: u16, message: Option<String> },

    #[error("Rejected with {status}: {}", .message.as_deref().unwrap_or("no message"))]
    ValidationError { status: u16, message: Option<String> },

    #[error("Session expired: {}", .message.as_deref().unwrap_or("no message"))]
    AuthExpired { message: Option<String> },

    #[error("Unexpected response body ({status}): {message}")]
    Decode { status: u16, message: String },
}

/// Status code of an expired or missing session
pub const AUTH_EXPIRED_STATUS: u16 = 401;

impl HttpError {
    /// Classify a transport failure (no response received)
    pub fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            HttpError::Timeout(timeout)
        } else if err.is_builder() {
            HttpError::Request(err.to_string())
        } else {
            HttpError::NetworkUnreachable(err.to_string())
        }
    }

    /// Classify an error status, pulling `message` out of a JSON body if present
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let message = server_message(body);
        match status {
            AUTH_EXPIRED_STATUS => HttpError::AuthExpired { message },
            400..=499 => HttpError::ValidationError { status, message },
            _ => HttpError::ServerError { status, message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            HttpError::NetworkUnreachable(_) => ErrorKind::NetworkUnreachable,
            HttpError::Timeout(_) => ErrorKind::Timeout,
            HttpError::Request(_) => ErrorKind::Request,
            HttpError::ServerError { .. } => ErrorKind::ServerError,
            HttpError::ValidationError { .. } => ErrorKind::ValidationError,
            HttpError::AuthExpired { .. } => ErrorKind::AuthExpired,
            HttpError::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Whether the server answered at all
    pub fn has_response(&self) -> bool {
        self.status().is_some()
    }

    /// HTTP status of the response, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::ServerError { status, .. }
            | HttpError::ValidationError { status, .. }
            | HttpError::Decode { status, .. } => Some(*status),
            HttpError::AuthExpired { .. } => Some(AUTH_EXPIRED_STATUS),
            HttpError::NetworkUnreachable(_) | HttpError::Timeout(_) | HttpError::Request(_) => None,
        }
    }

    /// Message supplied by the server in the error body
    pub fn server_message(&self) -> Option<&str> {
        match self {
            HttpError::ServerError { message, .. }
            | HttpError::ValidationError { message, .. }
            | HttpError::AuthExpired { message } => message.as_deref(),
            _ => None,
        }
    }
}

fn server_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")?
        .as_str()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
