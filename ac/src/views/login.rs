//! Sign-in form

use std::sync::Arc;

use backstore::AuthBackend;
use tracing::{debug, info};

use super::ViewError;

/// Where a successful sign-in leads unless told otherwise
pub const DEFAULT_REDIRECT: &str = "/home";

pub struct LoginView {
    auth: Arc<dyn AuthBackend>,
    email: String,
    password: String,
    touched: bool,
    loading: bool,
    error: Option<String>,
    redirect_to: String,
}

impl LoginView {
    pub fn new(auth: Arc<dyn AuthBackend>) -> Self {
        Self {
            auth,
            email: String::new(),
            password: String::new(),
            touched: false,
            loading: false,
            error: None,
            redirect_to: DEFAULT_REDIRECT.to_string(),
        }
    }

    pub fn with_redirect(mut self, redirect_to: impl Into<String>) -> Self {
        self.redirect_to = redirect_to.into();
        self
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn is_valid(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.trim().is_empty()
    }

    /// Field errors only show once a submit was attempted
    pub fn email_missing(&self) -> bool {
        self.touched && self.email.trim().is_empty()
    }

    pub fn password_missing(&self) -> bool {
        self.touched && self.password.trim().is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Last sign-in failure, cleared on the next attempt
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sign in and return the route to go to
    pub async fn submit(&mut self) -> Result<String, ViewError> {
        debug!(email = %self.email, "submit: called");
        self.touched = true;
        if !self.is_valid() {
            return Err(ViewError::MissingCredentials);
        }

        self.loading = true;
        self.error = None;
        let outcome = self.auth.sign_in_with_password(self.email.trim(), &self.password).await;
        self.loading = false;

        match outcome {
            Ok(session) => {
                info!(user_id = %session.user.id, "Signed in");
                Ok(self.redirect_to.clone())
            }
            Err(e) => {
                let message = e.to_string();
                self.error = Some(message.clone());
                Err(ViewError::SignIn(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use backstore::{AuthEvent, BackstoreError, Session, User};
    use std::sync::Mutex;
    use tokio::sync::broadcast;

    struct StubAuth {
        accept: bool,
        calls: Mutex<Vec<(String, String)>>,
        tx: broadcast::Sender<AuthEvent>,
    }

    impl StubAuth {
        fn new(accept: bool) -> Self {
            let (tx, _) = broadcast::channel(4);
            Self {
                accept,
                calls: Mutex::new(Vec::new()),
                tx,
            }
        }
    }

    #[async_trait]
    impl AuthBackend for StubAuth {
        async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackstoreError> {
            self.calls
                .lock()
                .unwrap()
                .push((email.to_string(), password.to_string()));
            if !self.accept {
                return Err(BackstoreError::InvalidCredentials("Invalid login credentials".to_string()));
            }
            Ok(Session {
                access_token: "token".to_string(),
                refresh_token: None,
                token_type: "bearer".to_string(),
                expires_in: 3600,
                expires_at: None,
                user: User {
                    id: "user-1".to_string(),
                    email: Some(email.to_string()),
                    user_metadata: serde_json::json!({}),
                },
            })
        }

        async fn sign_out(&self) -> Result<(), BackstoreError> {
            Ok(())
        }

        fn get_session(&self) -> Option<Session> {
            None
        }

        fn on_auth_state_change(&self) -> broadcast::Receiver<AuthEvent> {
            self.tx.subscribe()
        }
    }

    #[tokio::test]
    async fn test_blank_fields_rejected_without_call() {
        let auth = Arc::new(StubAuth::new(true));
        let mut view = LoginView::new(auth.clone());
        assert!(!view.email_missing());

        view.set_email("agent@example.com");
        view.set_password("   ");
        assert!(matches!(view.submit().await, Err(ViewError::MissingCredentials)));
        assert!(!view.email_missing());
        assert!(view.password_missing());
        assert!(auth.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_returns_redirect() {
        let auth = Arc::new(StubAuth::new(true));
        let mut view = LoginView::new(auth.clone());
        view.set_email("  agent@example.com ");
        view.set_password("secret");

        assert_eq!(view.submit().await.unwrap(), DEFAULT_REDIRECT);
        assert_eq!(auth.calls.lock().unwrap()[0].0, "agent@example.com");

        let mut custom = LoginView::new(auth).with_redirect("/properties");
        custom.set_email("agent@example.com");
        custom.set_password("secret");
        assert_eq!(custom.submit().await.unwrap(), "/properties");
    }

    #[tokio::test]
    async fn test_failure_keeps_error_text() {
        let mut view = LoginView::new(Arc::new(StubAuth::new(false)));
        view.set_email("agent@example.com");
        view.set_password("wrong");

        assert!(matches!(view.submit().await, Err(ViewError::SignIn(_))));
        assert!(view.error().unwrap().contains("Invalid login credentials"));
        assert!(!view.is_loading());
    }
}
