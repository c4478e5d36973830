// In-memory implementations of the moderation ports.
//
// Useful for tests and for hosts that keep notifications elsewhere and only
// need the detector's decisions.

use crate::core::moderation::{AccessControl, ModerationError, NotificationRequest, NotificationSink};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Notification sink backed by a `DashMap`.
pub struct InMemoryNotificationStore {
    next_id: AtomicU64,
    notifications: DashMap<u64, NotificationRequest>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            notifications: DashMap::new(),
        }
    }

    /// Notifications for a user in insertion order.
    pub fn for_user(&self, user_id: u64) -> Vec<NotificationRequest> {
        let mut found: Vec<(u64, NotificationRequest)> = self
            .notifications
            .iter()
            .filter(|entry| entry.value().recipient_user_id == user_id)
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        found.sort_by_key(|(id, _)| *id);
        found.into_iter().map(|(_, n)| n).collect()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}

impl Default for InMemoryNotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationStore {
    async fn persist(&self, request: &NotificationRequest) -> Result<u64, ModerationError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.notifications.insert(id, request.clone());
        Ok(id)
    }
}

/// Process-wide access-control switch.
pub struct AccessControlFlag {
    enabled: AtomicBool,
}

impl AccessControlFlag {
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
        }
    }
}

impl Default for AccessControlFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessControl for AccessControlFlag {
    fn is_access_control_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn disable_access_control(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    fn enable_access_control(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }
}
