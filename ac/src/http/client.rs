//! The analyzer's HTTP client
//!
//! Every call goes through [`ApiClient::send`], which raises the loading
//! start signal before anything else, guarantees exactly one end signal
//! whatever the outcome, runs the interceptors, and hands the original
//! result back to the caller.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{
    ActivityInterceptor, ApiResponse, HttpError, Interceptor, NotificationInterceptor, RequestConfig, RequestContext,
    RequestSpec, SessionExpiryInterceptor,
};
use crate::config::ApiConfig;
use crate::events::ActivityBus;
use crate::lifecycle::RequestLifecycle;
use crate::notify::Notifier;

/// Base URL used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Per-request timeout used when nothing is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Builder for [`ApiClient`]
pub struct ApiClientBuilder {
    base_url: String,
    timeout: Duration,
    lifecycle: Arc<RequestLifecycle>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl ApiClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Publish request events on `bus`
    pub fn activity(self, bus: Arc<ActivityBus>) -> Self {
        self.interceptor(Arc::new(ActivityInterceptor::new(bus)))
    }

    /// Raise success and error notifications through `notifier`
    pub fn notifier(self, notifier: Arc<dyn Notifier>) -> Self {
        self.interceptor(Arc::new(NotificationInterceptor::new(notifier)))
    }

    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn build(self) -> Result<ApiClient, HttpError> {
        debug!(base_url = %self.base_url, timeout = ?self.timeout, "build: called");
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| HttpError::Request(e.to_string()))?;

        Ok(ApiClient {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            timeout: self.timeout,
            http,
            lifecycle: self.lifecycle,
            interceptors: self.interceptors,
        })
    }
}

/// HTTP client wired to the loading lifecycle and the notification presenter
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    http: Client,
    lifecycle: Arc<RequestLifecycle>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl ApiClient {
    /// Start a builder with the default base URL and timeout
    ///
    /// The session expiry interceptor is always installed first.
    pub fn builder(lifecycle: Arc<RequestLifecycle>) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            lifecycle,
            interceptors: vec![Arc::new(SessionExpiryInterceptor)],
        }
    }

    /// Client with the standard interceptors for the given configuration
    pub fn from_config(
        config: &ApiConfig,
        lifecycle: Arc<RequestLifecycle>,
        notifier: Arc<dyn Notifier>,
        activity: Option<Arc<ActivityBus>>,
    ) -> Result<Self, HttpError> {
        debug!(?config, "from_config: called");
        let mut builder = Self::builder(lifecycle)
            .base_url(config.base_url.clone())
            .timeout(Duration::from_millis(config.timeout_ms));
        if let Some(bus) = activity {
            builder = builder.activity(bus);
        }
        builder.notifier(notifier).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn lifecycle(&self) -> &Arc<RequestLifecycle> {
        &self.lifecycle
    }

    /// Perform a call and return the raw response
    ///
    /// The error returned is the one that occurred; interceptors only observe it.
    pub async fn send(&self, spec: RequestSpec, config: &RequestConfig) -> Result<ApiResponse, HttpError> {
        self.dispatch(spec, config, |response| Ok(response.clone())).await
    }

    /// Perform a call and decode the JSON body
    ///
    /// Decoding happens inside the lifecycle, so a malformed body counts as a
    /// failed call and is notified like one.
    pub async fn send_json<T: DeserializeOwned>(&self, spec: RequestSpec, config: &RequestConfig) -> Result<T, HttpError> {
        self.dispatch(spec, config, ApiResponse::json::<T>).await
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        config: &RequestConfig,
    ) -> Result<T, HttpError> {
        let spec = query
            .iter()
            .fold(RequestSpec::get(path), |spec, (k, v)| spec.query(*k, v));
        self.send_json(spec, config).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        config: &RequestConfig,
    ) -> Result<T, HttpError> {
        let body = serde_json::to_value(body).map_err(|e| HttpError::Request(e.to_string()))?;
        self.send_json(RequestSpec::post(path).json(body), config).await
    }

    async fn dispatch<T>(
        &self,
        spec: RequestSpec,
        config: &RequestConfig,
        decode: impl FnOnce(&ApiResponse) -> Result<T, HttpError>,
    ) -> Result<T, HttpError> {
        let ctx = RequestContext::new(&spec);
        debug!(request_id = %ctx.id, method = %ctx.method, path = %ctx.path, "dispatch: called");

        let in_flight = self.lifecycle.begin();
        for interceptor in &self.interceptors {
            interceptor.on_request(&ctx);
        }

        let outcome = self
            .execute(spec)
            .await
            .and_then(|response| decode(&response).map(|value| (response, value)));
        in_flight.settle();

        match outcome {
            Ok((response, value)) => {
                debug!(request_id = %ctx.id, status = response.status, "dispatch: success");
                for interceptor in &self.interceptors {
                    interceptor.on_success(&ctx, &response, config);
                }
                Ok(value)
            }
            Err(e) => {
                debug!(request_id = %ctx.id, error = %e, "dispatch: failed");
                for interceptor in &self.interceptors {
                    interceptor.on_failure(&ctx, &e, config);
                }
                Err(e)
            }
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn execute(&self, spec: RequestSpec) -> Result<ApiResponse, HttpError> {
        let url = self.url(&spec.path);
        debug!(%url, "execute: called");

        let mut request = self.http.request(spec.method, &url);
        if !spec.query.is_empty() {
            request = request.query(&spec.query);
        }
        if let Some(body) = &spec.body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HttpError::from_transport(e, self.timeout))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::from_transport(e, self.timeout))?
            .to_vec();

        if !status.is_success() {
            debug!(status = status.as_u16(), "execute: error status");
            return Err(HttpError::from_status(status.as_u16(), &body));
        }

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
        })
    }
}
