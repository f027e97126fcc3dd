//! `POST /analyze`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::http::{ApiClient, HttpError, RequestConfig};

pub const ANALYZE_PATH: &str = "/analyze";
pub const ANALYSIS_SUCCESS_MESSAGE: &str = "Analysis completed successfully!";
pub const ANALYSIS_ERROR_MESSAGE: &str = "Analysis failed: check your connection to the server.";

#[derive(Debug, Clone, Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
}

/// Conformity score returned by the analysis server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// 0 to 100
    pub score: f64,
    pub status: String,
}

#[async_trait]
pub trait AnalysisApi: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<AnalysisResult, HttpError>;
}

/// Analysis calls through the shared [`ApiClient`]
pub struct AnalysisService {
    client: Arc<ApiClient>,
}

impl AnalysisService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    fn request_config() -> RequestConfig {
        RequestConfig::new()
            .with_success_message(ANALYSIS_SUCCESS_MESSAGE)
            .with_error_message(ANALYSIS_ERROR_MESSAGE)
    }
}

#[async_trait]
impl AnalysisApi for AnalysisService {
    async fn analyze(&self, text: &str) -> Result<AnalysisResult, HttpError> {
        debug!(len = text.len(), "analyze: called");
        self.client
            .post_json(ANALYZE_PATH, &AnalyzeRequest { text }, &Self::request_config())
            .await
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted analysis results for view tests
    pub struct MockAnalysisApi {
        responses: Mutex<Vec<Result<AnalysisResult, HttpError>>>,
        call_count: AtomicUsize,
    }

    impl MockAnalysisApi {
        pub fn new(mut responses: Vec<Result<AnalysisResult, HttpError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnalysisApi for MockAnalysisApi {
        async fn analyze(&self, _text: &str) -> Result<AnalysisResult, HttpError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(HttpError::Request("No more mock responses".to_string())))
        }
    }
}
