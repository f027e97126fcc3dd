//! HTTP client wrapper
//!
//! [`ApiClient`] performs calls against the analysis server. Each call:
//!
//! 1. signals loading start on the [`RequestLifecycle`](crate::lifecycle::RequestLifecycle)
//! 2. runs the `on_request` hooks
//! 3. sends the request and classifies the outcome as [`HttpError`] or success
//! 4. signals loading end (exactly once, also on cancellation)
//! 5. runs the `on_success` / `on_failure` hooks
//! 6. returns the original result
//!
//! Notification policy lives in [`NotificationInterceptor`], driven by the
//! per-call [`RequestConfig`].

mod client;
mod error;
mod interceptor;
mod request;

pub use client::{ApiClient, ApiClientBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{AUTH_EXPIRED_STATUS, ErrorKind, HttpError};
pub use interceptor::{
    ActivityInterceptor, FALLBACK_DECODE_MESSAGE, FALLBACK_ERROR_MESSAGE, FALLBACK_UNREACHABLE_MESSAGE, Interceptor, NotificationInterceptor,
    SessionExpiryInterceptor, error_text,
};
pub use request::{ApiResponse, RequestConfig, RequestContext, RequestSpec};
