use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{NotificationError, NotificationResult};
use crate::models::{NewNotification, Notification, PendingNotification};
use crate::repository::{NotificationRepository, PendingNotificationRepository};

/// FIFO hand-off between notification producers and delivery.
///
/// There is no retry or backoff here: whoever dequeues an entry owns it.
pub struct PendingNotificationQueue<N, P>
where
    N: NotificationRepository,
    P: PendingNotificationRepository,
{
    notifications: Arc<N>,
    pending: Arc<P>,
}

impl<N, P> Clone for PendingNotificationQueue<N, P>
where
    N: NotificationRepository,
    P: PendingNotificationRepository,
{
    fn clone(&self) -> Self {
        Self {
            notifications: Arc::clone(&self.notifications),
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<N, P> PendingNotificationQueue<N, P>
where
    N: NotificationRepository,
    P: PendingNotificationRepository,
{
    pub fn new(notifications: N, pending: P) -> Self {
        Self {
            notifications: Arc::new(notifications),
            pending: Arc::new(pending),
        }
    }

    /// Store a new notification and queue it for delivery.
    pub async fn submit(&self, input: NewNotification) -> NotificationResult<Notification> {
        let notification = self.store(input).await?;
        self.enqueue(&notification).await?;

        Ok(notification)
    }

    /// Store a new notification without queueing it.
    pub async fn store(&self, input: NewNotification) -> NotificationResult<Notification> {
        input
            .validate()
            .map_err(|e| NotificationError::Validation(e.to_string()))?;

        self.notifications.create(Notification::new(input)).await
    }

    /// Queue an already stored notification, copying its channels.
    pub async fn enqueue(&self, notification: &Notification) -> NotificationResult<PendingNotification> {
        let pending = self
            .pending
            .insert(PendingNotification::for_notification(notification))
            .await?;

        tracing::info!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            channels = ?pending.channels,
            "Notification queued"
        );
        Ok(pending)
    }

    /// Remove and return the oldest entry, or `None` when the queue is empty.
    pub async fn dequeue_oldest(&self) -> NotificationResult<Option<PendingNotification>> {
        let pending = self.pending.pop_oldest().await?;

        if let Some(ref entry) = pending {
            tracing::debug!(notification_id = %entry.notification_id, "Notification dequeued");
        }
        Ok(pending)
    }

    pub async fn peek_oldest(&self) -> NotificationResult<Option<PendingNotification>> {
        self.pending.peek_oldest().await
    }

    /// Drop a queue entry. The notification itself is kept.
    pub async fn delete(&self, notification_id: Uuid) -> NotificationResult<()> {
        if !self.pending.delete(notification_id).await? {
            return Err(NotificationError::NotFound(notification_id));
        }

        tracing::info!(notification_id = %notification_id, "Pending notification removed");
        Ok(())
    }

    pub async fn len(&self) -> NotificationResult<u64> {
        self.pending.count().await
    }

    pub async fn is_empty(&self) -> NotificationResult<bool> {
        Ok(self.len().await? == 0)
    }

    pub async fn notification(&self, id: Uuid) -> NotificationResult<Notification> {
        self.notifications
            .find_by_id(id)
            .await?
            .ok_or(NotificationError::NotFound(id))
    }
}
