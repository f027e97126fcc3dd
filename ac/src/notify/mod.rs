//! Notification presenter
//!
//! Success and error messages raised by the HTTP wrapper and the views go
//! through a [`Notifier`]. [`NotificationCenter`] keeps the set of visible
//! records and applies the dedup rule; [`ConsolePresenter`] renders them on
//! the terminal.

mod center;
mod console;
mod notification;

pub use center::{NotificationCenter, Placement};
pub use console::ConsolePresenter;
pub use notification::{API_ERROR_KEY, DEFAULT_DISPLAY_DURATION, Notification, NotificationKind};

/// Sink for user-facing notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}
