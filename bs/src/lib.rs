//! Backstore - client for the hosted auth + property row store
//!
//! The analyzer front-end leans on a backend-as-a-service for two things:
//! password sign-in with a persisted session, and a row store holding the
//! property listings. This crate wraps both behind small async clients.
//!
//! # Architecture
//!
//! ```text
//! {url}/auth/v1/token?grant_type=password   -> AuthClient::sign_in_with_password
//! {url}/auth/v1/logout                      -> AuthClient::sign_out
//! {url}/rest/v1/properties?order=...        -> PropertyStore::list_published
//!
//! <data_local_dir>/backstore/session.json   -> SessionFile (restored on startup)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use backstore::{AuthClient, BackstoreConfig, PropertyStore};
//!
//! let config = BackstoreConfig::load(None)?;
//! let auth = AuthClient::from_config(&config)?;
//! let mut events = auth.on_auth_state_change();
//! auth.sign_in_with_password("agent@example.com", "secret").await?;
//!
//! let store = PropertyStore::from_config(&config)?;
//! let listings = store.list_published(auth.get_session().as_ref()).await?;
//! ```

pub mod auth;
pub mod cli;
pub mod config;
mod error;
pub mod properties;
pub mod session;

pub use auth::{AuthBackend, AuthClient, AuthEvent};
pub use config::BackstoreConfig;
pub use error::BackstoreError;
pub use properties::{Property, PropertyBackend, PropertyStore};
pub use session::{Session, SessionFile, User};

/// Header carrying the project's anonymous key on every request
pub const API_KEY_HEADER: &str = "apikey";

/// Table holding property listings
pub const PROPERTIES_TABLE: &str = "properties";
