//! SeaORM entities for the `notifications` and `pending_notifications` tables.

pub mod notification;
pub mod pending_notification;

use sea_orm::entity::prelude::Json;

use crate::models::NotificationChannel;

pub(crate) fn channels_to_json(channels: &[NotificationChannel]) -> Json {
    Json::Array(
        channels
            .iter()
            .map(|c| Json::String(c.to_string()))
            .collect(),
    )
}

/// Unknown tags are skipped.
pub(crate) fn channels_from_json(value: &Json) -> Vec<NotificationChannel> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str()?.parse().ok())
                .collect()
        })
        .unwrap_or_default()
}
