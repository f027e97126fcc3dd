//! `GET /history`

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::http::{ApiClient, HttpError, RequestConfig, RequestSpec};

pub const HISTORY_PATH: &str = "/history";

/// Filters and page for one history fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    /// Omitted from the query string when `None`
    pub min_score: Option<u32>,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 5,
            search: String::new(),
            min_score: None,
        }
    }
}

impl HistoryQuery {
    pub fn to_request(&self) -> RequestSpec {
        RequestSpec::get(HISTORY_PATH)
            .query("page", self.page)
            .query("limit", self.limit)
            .query("search", &self.search)
            .query_opt("minScore", self.min_score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: i64,
    pub text: String,
    pub score: f64,
    pub created_on: String,
}

impl HistoryItem {
    /// Calendar date of `created_on`, accepting RFC 3339 or a bare timestamp
    pub fn created_date(&self) -> Option<NaiveDate> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.created_on) {
            return Some(dt.date_naive());
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(&self.created_on, "%Y-%m-%d %H:%M:%S%.f") {
            return Some(dt.date());
        }
        NaiveDate::parse_from_str(&self.created_on, "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub success: bool,
    pub data: Vec<HistoryItem>,
    pub pagination: PaginationInfo,
}

#[async_trait]
pub trait HistoryApi: Send + Sync {
    async fn history(&self, query: &HistoryQuery) -> Result<HistoryResponse, HttpError>;
}

/// History calls through the shared [`ApiClient`]
///
/// Uses the default request config: failures raise the standard error notification.
pub struct HistoryService {
    client: Arc<ApiClient>,
}

impl HistoryService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HistoryApi for HistoryService {
    async fn history(&self, query: &HistoryQuery) -> Result<HistoryResponse, HttpError> {
        debug!(?query, "history: called");
        self.client
            .send_json(query.to_request(), &RequestConfig::default())
            .await
    }
}
