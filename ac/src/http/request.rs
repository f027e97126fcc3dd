//! Request description, per-call configuration and raw responses

use std::time::Instant;

use reqwest::Method;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::HttpError;

/// Notification options attached to a single call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    /// Shown on success when set
    pub success_message: Option<String>,
    /// Replaces the default error text when set
    pub error_message: Option<String>,
    /// `false` suppresses every notification for this call
    pub show_notification: bool,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            success_message: None,
            error_message: None,
            show_notification: true,
        }
    }
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// No notification on success or failure
    pub fn silent() -> Self {
        Self {
            show_notification: false,
            ..Self::default()
        }
    }

    pub fn with_success_message(mut self, text: impl Into<String>) -> Self {
        self.success_message = Some(text.into());
        self
    }

    pub fn with_error_message(mut self, text: impl Into<String>) -> Self {
        self.error_message = Some(text.into());
        self
    }

    pub fn with_notification(mut self, show: bool) -> Self {
        self.show_notification = show;
        self
    }
}

/// An outbound call relative to the client's base URL
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a query parameter only when a value is present
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A response that arrived with a success status
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_slice(&self.body).map_err(|e| HttpError::Decode {
            status: self.status,
            message: e.to_string(),
        })
    }
}

/// Identity of one call as seen by the interceptors
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub id: Uuid,
    pub method: String,
    pub path: String,
    pub started: Instant,
}

impl RequestContext {
    pub fn new(spec: &RequestSpec) -> Self {
        Self {
            id: Uuid::now_v7(),
            method: spec.method.to_string(),
            path: spec.path.clone(),
            started: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}
