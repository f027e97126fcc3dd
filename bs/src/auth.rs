//! Password sign-in, session retrieval and auth-state events
//!
//! Auth state changes are published on a `tokio::sync::broadcast` channel.
//! Subscribers only see events emitted after they subscribed, so callers that
//! care about a restored session should subscribe before calling `restore`.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::sync::RwLock;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::BackstoreConfig;
use crate::session::{Session, SessionFile};
use crate::{API_KEY_HEADER, BackstoreError};

/// Capacity of the auth event channel
const AUTH_EVENT_CAPACITY: usize = 16;

/// Auth state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
    SessionRestored(Session),
}

impl AuthEvent {
    /// The session after this transition
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthEvent::SignedIn(s) | AuthEvent::SessionRestored(s) => Some(s),
            AuthEvent::SignedOut => None,
        }
    }
}

/// Authentication backend used by the login view and route guard
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange email + password for a session
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackstoreError>;

    /// Drop the current session locally and on the server
    async fn sign_out(&self) -> Result<(), BackstoreError>;

    /// The current session, if signed in
    fn get_session(&self) -> Option<Session>;

    /// Subscribe to auth state transitions
    fn on_auth_state_change(&self) -> broadcast::Receiver<AuthEvent>;
}

/// HTTP implementation of [`AuthBackend`]
pub struct AuthClient {
    base_url: String,
    api_key: String,
    http: Client,
    session_file: SessionFile,
    current: RwLock<Option<Session>>,
    tx: broadcast::Sender<AuthEvent>,
}

impl AuthClient {
    /// Create a client against `base_url`
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        session_file: SessionFile,
        timeout: Duration,
    ) -> Result<Self, BackstoreError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(%base_url, ?timeout, "AuthClient::new: called");
        let http = Client::builder().timeout(timeout).build()?;
        let (tx, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Ok(Self {
            base_url,
            api_key: api_key.into(),
            http,
            session_file,
            current: RwLock::new(None),
            tx,
        })
    }

    /// Create a client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &BackstoreConfig) -> Result<Self, BackstoreError> {
        debug!(url = %config.url, "AuthClient::from_config: called");
        Self::new(
            config.base_url(),
            config.api_key()?,
            SessionFile::new(&config.session_path),
            Duration::from_millis(config.timeout_ms),
        )
    }

    /// Load a persisted session, if any, and announce it
    pub fn restore(&self) -> Option<Session> {
        debug!("AuthClient::restore: called");
        let session = self.session_file.load()?;
        self.set_current(Some(session.clone()));
        info!(user_id = %session.user.id, "Restored session");
        self.emit(AuthEvent::SessionRestored(session.clone()));
        Some(session)
    }

    fn set_current(&self, session: Option<Session>) {
        match self.current.write() {
            Ok(mut guard) => *guard = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }

    fn emit(&self, event: AuthEvent) {
        // No subscribers is fine
        let _ = self.tx.send(event);
    }
}

#[async_trait]
impl AuthBackend for AuthClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackstoreError> {
        debug!(%email, "sign_in_with_password: called");
        let url = format!("{}/auth/v1/token", self.base_url);

        let response = self
            .http
            .post(&url)
            .query(&[("grant_type", "password")])
            .header(API_KEY_HEADER, &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            debug!(status, "sign_in_with_password: rejected");
            return Err(BackstoreError::from_response(status, &text));
        }

        let session: Session = response.json::<Session>().await?.stamped(Utc::now());
        if let Err(e) = self.session_file.save(&session) {
            warn!(error = %e, "sign_in_with_password: failed to persist session");
        }
        self.set_current(Some(session.clone()));
        info!(user_id = %session.user.id, "Signed in");
        self.emit(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), BackstoreError> {
        debug!("sign_out: called");
        if let Some(session) = self.get_session() {
            let url = format!("{}/auth/v1/logout", self.base_url);
            let result = self
                .http
                .post(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .header("Authorization", session.bearer())
                .send()
                .await;
            match result {
                Ok(r) if !r.status().is_success() => {
                    warn!(status = r.status().as_u16(), "sign_out: server refused logout, clearing locally")
                }
                Err(e) => warn!(error = %e, "sign_out: logout request failed, clearing locally"),
                Ok(_) => {}
            }
        } else {
            debug!("sign_out: no active session");
        }

        self.set_current(None);
        self.session_file.clear()?;
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    fn get_session(&self) -> Option<Session> {
        let session = match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        session.filter(|s| !s.is_expired_at(Utc::now()))
    }

    fn on_auth_state_change(&self) -> broadcast::Receiver<AuthEvent> {
        debug!("on_auth_state_change: new subscriber");
        self.tx.subscribe()
    }
}
