use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

use super::{channels_from_json, channels_to_json};

/// One row per queued notification, keyed by the notification id.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pending_notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub notification_id: Uuid,
    pub channels: Json,
    pub created_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::notification::Entity",
        from = "Column::NotificationId",
        to = "super::notification::Column::Id"
    )]
    Notification,
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notification.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::PendingNotification {
    fn from(model: Model) -> Self {
        Self {
            notification_id: model.notification_id,
            channels: channels_from_json(&model.channels),
            created_date: model.created_date.into(),
        }
    }
}

impl From<&crate::models::PendingNotification> for ActiveModel {
    fn from(pending: &crate::models::PendingNotification) -> Self {
        ActiveModel {
            notification_id: Set(pending.notification_id),
            channels: Set(channels_to_json(&pending.channels)),
            created_date: Set(pending.created_date.into()),
        }
    }
}
