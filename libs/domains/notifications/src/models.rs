use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

/// Delivery channel tag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationChannel {
    Email,
    Sms,
}

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub channels: Vec<NotificationChannel>,
    pub subject: String,
    pub body: String,
    pub created_date: DateTime<Utc>,
}

/// Input for a new notification.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "at least one channel is required"))]
    pub channels: Vec<NotificationChannel>,
    #[validate(length(min = 1, max = 255))]
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn new(input: NewNotification) -> Self {
        let mut channels: Vec<NotificationChannel> = Vec::with_capacity(input.channels.len());
        for channel in input.channels {
            if !channels.contains(&channel) {
                channels.push(channel);
            }
        }

        Self {
            // v7 ids sort by creation time
            id: Uuid::now_v7(),
            user_id: input.user_id,
            channels,
            subject: input.subject,
            body: input.body,
            created_date: Utc::now(),
        }
    }
}

/// Queue entry for a notification awaiting delivery.
///
/// Holds the notification id as a plain reference and a copy of its
/// channels taken when the entry was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingNotification {
    pub notification_id: Uuid,
    pub channels: Vec<NotificationChannel>,
    pub created_date: DateTime<Utc>,
}

impl PendingNotification {
    pub fn for_notification(notification: &Notification) -> Self {
        Self {
            notification_id: notification.id,
            channels: notification.channels.clone(),
            created_date: Utc::now(),
        }
    }
}
