//! Visible notification set with replace-on-dedup

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use tracing::debug;
use uuid::Uuid;

use super::{Notification, Notifier};

/// What `push` did with a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Added,
    /// Took the slot of a visible record with the same dedup key
    Replaced,
}

/// Holds the notifications currently on screen
#[derive(Default)]
pub struct NotificationCenter {
    visible: Mutex<Vec<Notification>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a record, pruning anything expired as of its creation time
    pub fn push(&self, notification: Notification) -> Placement {
        let now = notification.created_at;
        let mut visible = self.visible.lock().unwrap_or_else(PoisonError::into_inner);
        visible.retain(|n| !n.is_expired_at(now));

        let existing = notification
            .dedup_key
            .as_ref()
            .and_then(|key| visible.iter().position(|n| n.dedup_key.as_ref() == Some(key)));

        match existing {
            Some(idx) => {
                debug!(key = ?notification.dedup_key, "NotificationCenter::push: replacing visible record");
                visible[idx] = notification;
                Placement::Replaced
            }
            None => {
                visible.push(notification);
                Placement::Added
            }
        }
    }

    /// Remove a record on user action; returns whether it was visible
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut visible = self.visible.lock().unwrap_or_else(PoisonError::into_inner);
        let before = visible.len();
        visible.retain(|n| n.id != id);
        before != visible.len()
    }

    /// Records still visible at `now`, oldest first
    pub fn visible_at(&self, now: Instant) -> Vec<Notification> {
        let mut visible = self.visible.lock().unwrap_or_else(PoisonError::into_inner);
        visible.retain(|n| !n.is_expired_at(now));
        visible.clone()
    }

    pub fn visible(&self) -> Vec<Notification> {
        self.visible_at(Instant::now())
    }
}

impl Notifier for NotificationCenter {
    fn notify(&self, notification: Notification) {
        self.push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{API_ERROR_KEY, NotificationKind};
    use std::time::Duration;

    #[test]
    fn test_distinct_records_stack() {
        let center = NotificationCenter::new();
        assert_eq!(center.push(Notification::success("one")), Placement::Added);
        assert_eq!(center.push(Notification::error("two")), Placement::Added);
        assert_eq!(center.visible().len(), 2);
    }

    #[test]
    fn test_same_dedup_key_replaces() {
        let center = NotificationCenter::new();
        let start = Instant::now();

        let first = Notification::error("Server unreachable")
            .with_dedup_key(API_ERROR_KEY)
            .created_at(start);
        let second = Notification::error("Still unreachable")
            .with_dedup_key(API_ERROR_KEY)
            .created_at(start + Duration::from_millis(500));

        assert_eq!(center.push(first), Placement::Added);
        assert_eq!(center.push(second.clone()), Placement::Replaced);

        let visible = center.visible_at(start + Duration::from_millis(600));
        assert_eq!(visible, vec![second]);
    }

    #[test]
    fn test_expired_key_is_added_again() {
        let center = NotificationCenter::new();
        let start = Instant::now();

        center.push(Notification::error("a").with_dedup_key(API_ERROR_KEY).created_at(start));
        let later = Notification::error("b")
            .with_dedup_key(API_ERROR_KEY)
            .created_at(start + Duration::from_secs(5));
        assert_eq!(center.push(later), Placement::Added);
    }

    #[test]
    fn test_dismiss() {
        let center = NotificationCenter::new();
        let n = Notification::success("bye");
        let id = n.id;
        center.push(n);

        assert!(center.dismiss(id));
        assert!(!center.dismiss(id));
        assert!(center.visible().is_empty());
    }

    #[test]
    fn test_visible_prunes_expired() {
        let center = NotificationCenter::new();
        let start = Instant::now();
        center.push(Notification::success("short").created_at(start).with_duration(Duration::from_millis(10)));
        center.push(Notification::new(NotificationKind::Error, "long").created_at(start));

        let visible = center.visible_at(start + Duration::from_millis(20));
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "long");
    }
}
