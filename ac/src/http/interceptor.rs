//! Interceptors run by [`ApiClient`](super::ApiClient) around every call
//!
//! Hooks fire in registration order. `on_request` runs after the loading
//! start signal, the settle hooks run after the end signal.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{ApiResponse, HttpError, RequestConfig, RequestContext};
use crate::events::{ActivityBus, ApiEvent};
use crate::notify::{API_ERROR_KEY, Notification, Notifier};

/// Shown when no response arrived and the call has no custom error text
pub const FALLBACK_UNREACHABLE_MESSAGE: &str = "The server is unreachable. Check that it is running.";

/// Shown when the server answered with an error but gave no message
pub const FALLBACK_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// Shown when a success status came back with a body of the wrong shape
pub const FALLBACK_DECODE_MESSAGE: &str = "The server sent a response that could not be read.";

/// Hooks observing one API call
pub trait Interceptor: Send + Sync {
    fn on_request(&self, _ctx: &RequestContext) {}

    fn on_success(&self, _ctx: &RequestContext, _response: &ApiResponse, _config: &RequestConfig) {}

    fn on_failure(&self, _ctx: &RequestContext, _error: &HttpError, _config: &RequestConfig) {}
}

/// Text shown for a failed call
///
/// An unreadable success body always gets its own text. Otherwise custom
/// error text wins, then the server's own message, then a fallback depending
/// on whether a response arrived at all.
pub fn error_text(error: &HttpError, config: &RequestConfig) -> String {
    if let HttpError::Decode { .. } = error {
        return FALLBACK_DECODE_MESSAGE.to_string();
    }
    if let Some(custom) = &config.error_message {
        return custom.clone();
    }
    if !error.has_response() {
        return FALLBACK_UNREACHABLE_MESSAGE.to_string();
    }
    error
        .server_message()
        .unwrap_or(FALLBACK_ERROR_MESSAGE)
        .to_string()
}

/// Raises success and error notifications per [`RequestConfig`]
pub struct NotificationInterceptor {
    notifier: Arc<dyn Notifier>,
}

impl NotificationInterceptor {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

impl Interceptor for NotificationInterceptor {
    fn on_success(&self, _ctx: &RequestContext, _response: &ApiResponse, config: &RequestConfig) {
        if !config.show_notification {
            return;
        }
        if let Some(text) = &config.success_message {
            self.notifier.notify(Notification::success(text.clone()));
        }
    }

    fn on_failure(&self, ctx: &RequestContext, error: &HttpError, config: &RequestConfig) {
        if !config.show_notification {
            debug!(path = %ctx.path, "on_failure: notification suppressed");
            return;
        }
        let text = error_text(error, config);
        self.notifier
            .notify(Notification::error(text).with_dedup_key(API_ERROR_KEY));
    }
}

/// Logs a warning when the session is rejected
///
/// Nothing else happens here; the caller decides whether to sign in again.
#[derive(Debug, Default)]
pub struct SessionExpiryInterceptor;

impl Interceptor for SessionExpiryInterceptor {
    fn on_failure(&self, ctx: &RequestContext, error: &HttpError, _config: &RequestConfig) {
        if let HttpError::AuthExpired { .. } = error {
            warn!(path = %ctx.path, "Session expired or unauthorized");
        }
    }
}

/// Publishes an [`ApiEvent`] for each phase of a call
pub struct ActivityInterceptor {
    bus: Arc<ActivityBus>,
}

impl ActivityInterceptor {
    pub fn new(bus: Arc<ActivityBus>) -> Self {
        Self { bus }
    }
}

impl Interceptor for ActivityInterceptor {
    fn on_request(&self, ctx: &RequestContext) {
        self.bus.emit(ApiEvent::RequestStarted {
            request_id: ctx.id.to_string(),
            method: ctx.method.clone(),
            path: ctx.path.clone(),
        });
    }

    fn on_success(&self, ctx: &RequestContext, response: &ApiResponse, _config: &RequestConfig) {
        self.bus.emit(ApiEvent::RequestSucceeded {
            request_id: ctx.id.to_string(),
            status: response.status,
            duration_ms: ctx.elapsed_ms(),
        });
    }

    fn on_failure(&self, ctx: &RequestContext, error: &HttpError, _config: &RequestConfig) {
        self.bus.emit(ApiEvent::RequestFailed {
            request_id: ctx.id.to_string(),
            kind: error.kind(),
            status: error.status(),
            message: error.to_string(),
            duration_ms: ctx.elapsed_ms(),
        });
    }
}
