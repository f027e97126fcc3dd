//! Notification records

use std::time::{Duration, Instant};

use uuid::Uuid;

/// How long a notification stays visible unless dismissed
pub const DEFAULT_DISPLAY_DURATION: Duration = Duration::from_millis(4000);

/// Dedup key shared by every error raised from the HTTP wrapper
pub const API_ERROR_KEY: &str = "api-error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl NotificationKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Success => "✓",
            NotificationKind::Error => "✗",
        }
    }
}

/// A transient message shown to the user
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub text: String,
    /// Records sharing a key replace each other instead of stacking
    pub dedup_key: Option<String>,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Notification {
    pub fn new(kind: NotificationKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            dedup_key: None,
            created_at: Instant::now(),
            duration: DEFAULT_DISPLAY_DURATION,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NotificationKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NotificationKind::Error, text)
    }

    pub fn with_dedup_key(mut self, key: impl Into<String>) -> Self {
        self.dedup_key = Some(key.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn created_at(mut self, at: Instant) -> Self {
        self.created_at = at;
        self
    }

    pub fn expires_at(&self) -> Instant {
        self.created_at + self.duration
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let n = Notification::error("Server down");
        assert_eq!(n.kind, NotificationKind::Error);
        assert_eq!(n.duration, DEFAULT_DISPLAY_DURATION);
        assert!(n.dedup_key.is_none());
        assert_ne!(n.id, Notification::error("Server down").id);
    }

    #[test]
    fn test_expiry() {
        let start = Instant::now();
        let n = Notification::success("Saved").created_at(start);
        assert!(!n.is_expired_at(start + Duration::from_millis(3999)));
        assert!(n.is_expired_at(start + Duration::from_millis(4000)));
    }

    #[test]
    fn test_icons_differ() {
        assert_ne!(NotificationKind::Success.icon(), NotificationKind::Error.icon());
    }
}
