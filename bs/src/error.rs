//! Backstore error types

use thiserror::Error;

/// Errors raised by the auth and property clients
#[derive(Debug, Error)]
pub enum BackstoreError {
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Backstore API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API key not found. Set the {0} environment variable.")]
    MissingApiKey(String),

    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BackstoreError {
    /// Build an error from a non-success response body
    ///
    /// The hosted service reports failures as `{"error_description": ...}`,
    /// `{"msg": ...}` or `{"message": ...}` depending on the endpoint.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                ["error_description", "msg", "message"]
                    .iter()
                    .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
            })
            .unwrap_or_else(|| body.trim().to_string());

        if status == 400 || status == 401 {
            BackstoreError::InvalidCredentials(message)
        } else {
            BackstoreError::Api { status, message }
        }
    }

    /// True when the failure came from the user's input rather than the service
    pub fn is_credentials(&self) -> bool {
        matches!(self, BackstoreError::InvalidCredentials(_))
    }
}
