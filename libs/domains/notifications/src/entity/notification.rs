use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;

use super::{channels_from_json, channels_to_json};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub channels: Json, // JSONB array of channel tags
    #[sea_orm(column_type = "Text")]
    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub created_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for crate::models::Notification {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            channels: channels_from_json(&model.channels),
            subject: model.subject,
            body: model.body,
            created_date: model.created_date.into(),
        }
    }
}

impl From<&crate::models::Notification> for ActiveModel {
    fn from(notification: &crate::models::Notification) -> Self {
        ActiveModel {
            id: Set(notification.id),
            user_id: Set(notification.user_id),
            channels: Set(channels_to_json(&notification.channels)),
            subject: Set(notification.subject.clone()),
            body: Set(notification.body.clone()),
            created_date: Set(notification.created_date.into()),
        }
    }
}
