//! Property listings from the row store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::BackstoreConfig;
use crate::session::Session;
use crate::{API_KEY_HEADER, BackstoreError, PROPERTIES_TABLE};

/// A property listing row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub city: String,
    pub agent_id: String,
    #[serde(default)]
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

/// Source of property listings
#[async_trait]
pub trait PropertyBackend: Send + Sync {
    /// Published properties, newest first
    async fn list_published(&self, session: Option<&Session>) -> Result<Vec<Property>, BackstoreError>;
}

/// HTTP implementation of [`PropertyBackend`]
pub struct PropertyStore {
    base_url: String,
    api_key: String,
    http: Client,
}

impl PropertyStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self, BackstoreError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%base_url, "PropertyStore::new: called");
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            api_key: api_key.into(),
            http,
        })
    }

    pub fn from_config(config: &BackstoreConfig) -> Result<Self, BackstoreError> {
        Self::new(config.base_url(), config.api_key()?, Duration::from_millis(config.timeout_ms))
    }
}

#[async_trait]
impl PropertyBackend for PropertyStore {
    async fn list_published(&self, session: Option<&Session>) -> Result<Vec<Property>, BackstoreError> {
        debug!(signed_in = session.is_some(), "list_published: called");
        let url = format!("{}/rest/v1/{}", self.base_url, PROPERTIES_TABLE);

        // Row-level security decides what the anonymous key can read; a
        // signed-in user's token widens it to their own drafts.
        let bearer = match session {
            Some(s) => s.bearer(),
            None => format!("Bearer {}", self.api_key),
        };

        let response = self
            .http
            .get(&url)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .header(API_KEY_HEADER, &self.api_key)
            .header("Authorization", bearer)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(status, "list_published: API error");
            return Err(BackstoreError::from_response(status, &text));
        }

        let rows: Vec<Property> = response.json().await?;
        let total = rows.len();
        let published = only_published(rows);
        debug!(total, published = published.len(), "list_published: filtered rows");
        Ok(published)
    }
}

/// Keep published rows, newest first
pub fn only_published(rows: Vec<Property>) -> Vec<Property> {
    let mut published: Vec<Property> = rows.into_iter().filter(|p| p.is_published).collect();
    published.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    published
}
