//! Terminal rendering of notifications

use std::io::Write;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use colored::*;
use tracing::{debug, warn};

use super::{Notification, NotificationCenter, NotificationKind, Notifier, Placement};

/// Prints notifications as they appear
///
/// A record that replaces a visible one with the same dedup key is not
/// printed again, so a burst of identical failures shows up once.
pub struct ConsolePresenter {
    center: NotificationCenter,
    out: Mutex<Box<dyn Write + Send>>,
    display: Duration,
}

impl ConsolePresenter {
    pub fn new(out: Box<dyn Write + Send>, display: Duration) -> Self {
        Self {
            center: NotificationCenter::new(),
            out: Mutex::new(out),
            display,
        }
    }

    /// Presenter writing to stderr
    pub fn stderr(display: Duration) -> Self {
        Self::new(Box::new(std::io::stderr()), display)
    }

    pub fn center(&self) -> &NotificationCenter {
        &self.center
    }

    fn render(notification: &Notification) -> String {
        match notification.kind {
            NotificationKind::Success => format!("{} {}", notification.kind.icon().green().bold(), notification.text.green()),
            NotificationKind::Error => format!("{} {}", notification.kind.icon().red().bold(), notification.text.red()),
        }
    }
}

impl Notifier for ConsolePresenter {
    fn notify(&self, notification: Notification) {
        let notification = notification.with_duration(self.display);
        let line = Self::render(&notification);
        match self.center.push(notification) {
            Placement::Added => {
                let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
                if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
                    warn!(error = %e, "ConsolePresenter: failed to write notification");
                }
            }
            Placement::Replaced => debug!("ConsolePresenter: deduplicated notification not re-rendered"),
        }
    }
}
