//! Screen state for the analyzer client
//!
//! Each view model owns the state one screen needs and talks to the
//! server through the service traits, so the CLI renders them and the
//! tests drive them with mocks.

pub mod analyzer;
pub mod guard;
pub mod history;
pub mod loader;
pub mod login;
pub mod properties;

use thiserror::Error;

use crate::http::HttpError;

pub use analyzer::{AnalyzerView, Verdict, score_label};
pub use guard::{Access, RouteGuard};
pub use history::HistoryView;
pub use loader::GlobalLoader;
pub use login::LoginView;
pub use properties::{PropertyListView, format_price};

/// Errors surfaced by view models
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("The text must contain more than {min} characters.")]
    TextTooShort { min: usize },

    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Sign-in failed: {0}")]
    SignIn(String),

    #[error(transparent)]
    Http(#[from] HttpError),
}
