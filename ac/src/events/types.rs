//! Event types for request activity
//!
//! Every call through the API client produces a `RequestStarted` followed by
//! exactly one of `RequestSucceeded` / `RequestFailed`, all sharing the same
//! request ID.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::ErrorKind;

/// Request activity vocabulary
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ApiEvent {
    /// A request is about to be sent
    RequestStarted {
        request_id: String,
        method: String,
        path: String,
    },
    /// A request settled with a success status
    RequestSucceeded {
        request_id: String,
        status: u16,
        duration_ms: u64,
    },
    /// A request settled with an error
    RequestFailed {
        request_id: String,
        kind: ErrorKind,
        status: Option<u16>,
        message: String,
        duration_ms: u64,
    },
}

impl ApiEvent {
    /// Get the request ID for this event
    pub fn request_id(&self) -> &str {
        match self {
            ApiEvent::RequestStarted { request_id, .. }
            | ApiEvent::RequestSucceeded { request_id, .. }
            | ApiEvent::RequestFailed { request_id, .. } => request_id,
        }
    }

    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            ApiEvent::RequestStarted { .. } => "RequestStarted",
            ApiEvent::RequestSucceeded { .. } => "RequestSucceeded",
            ApiEvent::RequestFailed { .. } => "RequestFailed",
        }
    }

    /// Last eight characters of the request ID
    ///
    /// Request IDs are v7 UUIDs whose leading characters are a timestamp,
    /// so the tail is what tells nearby requests apart.
    pub fn short_id(&self) -> &str {
        let id = self.request_id();
        id.get(id.len().saturating_sub(8)..).unwrap_or(id)
    }
}

/// A timestamped event log entry for file persistence
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventLogEntry {
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    pub event: ApiEvent,
}

impl EventLogEntry {
    pub fn new(event: ApiEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}
