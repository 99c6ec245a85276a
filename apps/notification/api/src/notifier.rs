//! Verification messages handed to the notification queue.

use async_trait::async_trait;
use database::{RetryConfig, retry_with_backoff};
use domain_contact_details::{
    DispatchError, Locale, MessageKey, VerificationConfig, VerificationDispatch,
    VerificationNotifier, resolve,
};
use domain_notifications::{
    NewNotification, NotificationChannel, NotificationRepository, PendingNotificationQueue,
    PendingNotificationRepository,
};

/// Renders the verification email and queues it for the email channel.
pub struct QueueNotifier<N, P>
where
    N: NotificationRepository,
    P: PendingNotificationRepository,
{
    queue: PendingNotificationQueue<N, P>,
    config: VerificationConfig,
    locale: Locale,
}

impl<N, P> QueueNotifier<N, P>
where
    N: NotificationRepository,
    P: PendingNotificationRepository,
{
    pub fn new(queue: PendingNotificationQueue<N, P>, config: VerificationConfig, locale: Locale) -> Self {
        Self {
            queue,
            config,
            locale,
        }
    }

    fn render(&self, dispatch: &VerificationDispatch) -> NewNotification {
        let link = self
            .config
            .verification_link(dispatch.user_id, dispatch.token_id);
        let expires = dispatch.expiration_date.to_rfc3339();

        NewNotification {
            user_id: dispatch.user_id,
            channels: vec![NotificationChannel::Email],
            subject: resolve(MessageKey::VerificationEmailSubject, self.locale, &[]),
            body: resolve(
                MessageKey::VerificationEmailBody,
                self.locale,
                &[dispatch.email_address.as_str(), link.as_str(), expires.as_str()],
            ),
        }
    }
}

#[async_trait]
impl<N, P> VerificationNotifier for QueueNotifier<N, P>
where
    N: NotificationRepository,
    P: PendingNotificationRepository,
{
    async fn send_verification(&self, dispatch: VerificationDispatch) -> Result<(), DispatchError> {
        let message = self.render(&dispatch);
        let retry = RetryConfig::new().with_max_retries(self.config.dispatch_retries);

        let notification = retry_with_backoff(|| self.queue.store(message.clone()), retry.clone())
            .await
            .map_err(|e| DispatchError(e.to_string()))?;
        retry_with_backoff(|| self.queue.enqueue(&notification), retry)
            .await
            .map_err(|e| DispatchError(e.to_string()))?;

        tracing::info!(
            user_id = %dispatch.user_id,
            token_id = %dispatch.token_id,
            notification_id = %notification.id,
            "Verification email queued"
        );
        Ok(())
    }
}
