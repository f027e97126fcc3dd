//! Analysis history screen
//!
//! Holds the page, the filters and the last fetched page of items. Changing
//! a filter goes back to page 1; page moves are clamped to the known range
//! and only refetch when the page actually changes.

use std::sync::Arc;

use tracing::{debug, error};

use super::ViewError;
use super::analyzer::{Verdict, score_label};
use crate::services::{HistoryApi, HistoryItem, HistoryQuery, PaginationInfo};

pub const DEFAULT_MIN_SCORE: u32 = 1;
pub const MAX_MIN_SCORE: u32 = 100;
pub const EMPTY_MESSAGE: &str = "No analyses found";

pub struct HistoryView {
    api: Arc<dyn HistoryApi>,
    page: u32,
    limit: u32,
    search: String,
    min_score: u32,
    items: Vec<HistoryItem>,
    pagination: Option<PaginationInfo>,
    loading: bool,
    error: bool,
}

impl HistoryView {
    pub fn new(api: Arc<dyn HistoryApi>, limit: u32) -> Self {
        Self {
            api,
            page: 1,
            limit: limit.max(1),
            search: String::new(),
            min_score: DEFAULT_MIN_SCORE,
            items: Vec::new(),
            pagination: None,
            loading: false,
            error: false,
        }
    }

    /// Start from a given page and filters without fetching
    pub fn with_query(mut self, page: u32, search: impl Into<String>, min_score: u32) -> Self {
        self.page = page.max(1);
        self.search = search.into();
        self.min_score = min_score.clamp(DEFAULT_MIN_SCORE, MAX_MIN_SCORE);
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn min_score(&self) -> u32 {
        self.min_score
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn pagination(&self) -> Option<&PaginationInfo> {
        self.pagination.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    /// At least 1, even before the first fetch
    pub fn total_pages(&self) -> u32 {
        self.pagination.as_ref().map_or(1, |p| p.total_pages.max(1))
    }

    /// Pagination controls are only shown for more than one page
    pub fn shows_pagination(&self) -> bool {
        self.total_pages() > 1
    }

    pub fn query(&self) -> HistoryQuery {
        HistoryQuery {
            page: self.page,
            limit: self.limit,
            search: self.search.clone(),
            min_score: Some(self.min_score),
        }
    }

    /// Fetch the current page with the current filters
    pub async fn refresh(&mut self) -> Result<(), ViewError> {
        let query = self.query();
        debug!(?query, "refresh: called");
        self.loading = true;
        self.error = false;

        let outcome = self.api.history(&query).await;
        self.loading = false;

        match outcome {
            Ok(response) => {
                self.items = response.data;
                self.pagination = Some(response.pagination);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "refresh: failed to fetch history");
                self.error = true;
                Err(e.into())
            }
        }
    }

    /// Fetch again after a failure
    pub async fn retry(&mut self) -> Result<(), ViewError> {
        self.refresh().await
    }

    pub async fn set_search(&mut self, search: impl Into<String>) -> Result<(), ViewError> {
        self.search = search.into();
        self.page = 1;
        self.refresh().await
    }

    /// Clamped to 1..=100
    pub async fn set_min_score(&mut self, min_score: u32) -> Result<(), ViewError> {
        self.min_score = min_score.clamp(DEFAULT_MIN_SCORE, MAX_MIN_SCORE);
        self.page = 1;
        self.refresh().await
    }

    /// Move to `page`, clamped to the known range
    ///
    /// Returns `Ok(false)` without fetching when the page does not change.
    pub async fn go_to(&mut self, page: u32) -> Result<bool, ViewError> {
        let target = page.clamp(1, self.total_pages());
        if target == self.page {
            debug!(page, "go_to: page unchanged");
            return Ok(false);
        }
        self.page = target;
        self.refresh().await?;
        Ok(true)
    }

    pub async fn next_page(&mut self) -> Result<bool, ViewError> {
        self.go_to(self.page.saturating_add(1)).await
    }

    pub async fn prev_page(&mut self) -> Result<bool, ViewError> {
        self.go_to(self.page.saturating_sub(1)).await
    }

    /// Plain-text table of the current page
    pub fn render(&self) -> String {
        if self.items.is_empty() {
            return format!("{}\n", EMPTY_MESSAGE);
        }

        let mut out = String::new();
        for item in &self.items {
            let date = item
                .created_date()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| item.created_on.clone());
            let marker = match Verdict::for_score(item.score) {
                Verdict::Compliant => "+",
                Verdict::Partial => "!",
            };
            out.push_str(&format!(
                "{:<10}  {:>6} {}  {}\n",
                date,
                score_label(item.score),
                marker,
                first_line(&item.text, 60)
            ));
        }
        if self.shows_pagination() {
            out.push_str(&format!("page {}/{}\n", self.page, self.total_pages()));
        }
        out
    }
}

fn first_line(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() > max {
        let cut: String = line.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}
