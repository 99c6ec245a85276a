use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::NotificationResult;
use crate::models::{Notification, PendingNotification};

/// Repository trait for Notification persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: Notification) -> NotificationResult<Notification>;

    async fn find_by_id(&self, id: Uuid) -> NotificationResult<Option<Notification>>;
}

/// Repository trait for the pending queue.
///
/// Entries come out oldest `created_date` first. No operation here touches
/// the referenced notification.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PendingNotificationRepository: Send + Sync {
    async fn insert(&self, pending: PendingNotification)
    -> NotificationResult<PendingNotification>;

    /// Remove and return the oldest entry.
    async fn pop_oldest(&self) -> NotificationResult<Option<PendingNotification>>;

    async fn peek_oldest(&self) -> NotificationResult<Option<PendingNotification>>;

    /// Returns false when no entry exists for `notification_id`.
    async fn delete(&self, notification_id: Uuid) -> NotificationResult<bool>;

    async fn count(&self) -> NotificationResult<u64>;
}

/// In-memory implementation of NotificationRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryNotificationRepository {
    notifications: Arc<RwLock<HashMap<Uuid, Notification>>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn create(&self, notification: Notification) -> NotificationResult<Notification> {
        let mut notifications = self.notifications.write().await;
        notifications.insert(notification.id, notification.clone());

        tracing::debug!(notification_id = %notification.id, "Stored notification");
        Ok(notification)
    }

    async fn find_by_id(&self, id: Uuid) -> NotificationResult<Option<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications.get(&id).cloned())
    }
}

/// In-memory queue kept in insertion order.
///
/// Insertion order breaks ties between equal timestamps.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPendingNotificationRepository {
    entries: Arc<RwLock<Vec<PendingNotification>>>,
}

impl InMemoryPendingNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn oldest_index(entries: &[PendingNotification]) -> Option<usize> {
    entries
        .iter()
        .enumerate()
        .min_by_key(|(_, entry)| entry.created_date)
        .map(|(index, _)| index)
}

#[async_trait]
impl PendingNotificationRepository for InMemoryPendingNotificationRepository {
    async fn insert(
        &self,
        pending: PendingNotification,
    ) -> NotificationResult<PendingNotification> {
        let mut entries = self.entries.write().await;
        entries.retain(|e| e.notification_id != pending.notification_id);
        entries.push(pending.clone());
        Ok(pending)
    }

    async fn pop_oldest(&self) -> NotificationResult<Option<PendingNotification>> {
        let mut entries = self.entries.write().await;
        Ok(oldest_index(&entries).map(|index| entries.remove(index)))
    }

    async fn peek_oldest(&self) -> NotificationResult<Option<PendingNotification>> {
        let entries = self.entries.read().await;
        Ok(oldest_index(&entries).map(|index| entries[index].clone()))
    }

    async fn delete(&self, notification_id: Uuid) -> NotificationResult<bool> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.notification_id != notification_id);
        Ok(entries.len() < before)
    }

    async fn count(&self) -> NotificationResult<u64> {
        Ok(self.entries.read().await.len() as u64)
    }
}
