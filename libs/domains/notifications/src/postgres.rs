use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait, QueryOrder,
    Statement,
};
use uuid::Uuid;

use crate::{
    entity::{notification, pending_notification},
    error::{NotificationError, NotificationResult},
    models::{Notification, PendingNotification},
    repository::{NotificationRepository, PendingNotificationRepository},
};

fn db_error(e: sea_orm::DbErr) -> NotificationError {
    NotificationError::Database(e.to_string())
}

pub struct PgNotificationRepository {
    db: DatabaseConnection,
}

impl PgNotificationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn create(&self, notification: Notification) -> NotificationResult<Notification> {
        let model = notification::ActiveModel::from(&notification)
            .insert(&self.db)
            .await
            .map_err(db_error)?;

        tracing::debug!(notification_id = %model.id, "Stored notification");
        Ok(model.into())
    }

    async fn find_by_id(&self, id: Uuid) -> NotificationResult<Option<Notification>> {
        let model = notification::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }
}

pub struct PgPendingNotificationRepository {
    db: DatabaseConnection,
}

impl PgPendingNotificationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// Single statement so concurrent consumers never receive the same row.
const POP_OLDEST_SQL: &str = r#"
DELETE FROM pending_notifications
WHERE notification_id = (
    SELECT notification_id FROM pending_notifications
    ORDER BY created_date ASC, notification_id ASC
    LIMIT 1
    FOR UPDATE SKIP LOCKED
)
RETURNING notification_id, channels, created_date
"#;

#[async_trait]
impl PendingNotificationRepository for PgPendingNotificationRepository {
    async fn insert(
        &self,
        pending: PendingNotification,
    ) -> NotificationResult<PendingNotification> {
        let model = pending_notification::ActiveModel::from(&pending)
            .insert(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.into())
    }

    async fn pop_oldest(&self) -> NotificationResult<Option<PendingNotification>> {
        let model = pending_notification::Entity::find()
            .from_raw_sql(Statement::from_string(DbBackend::Postgres, POP_OLDEST_SQL))
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn peek_oldest(&self) -> NotificationResult<Option<PendingNotification>> {
        let model = pending_notification::Entity::find()
            .order_by_asc(pending_notification::Column::CreatedDate)
            .order_by_asc(pending_notification::Column::NotificationId)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn delete(&self, notification_id: Uuid) -> NotificationResult<bool> {
        let result = pending_notification::Entity::delete_by_id(notification_id)
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn count(&self) -> NotificationResult<u64> {
        pending_notification::Entity::find()
            .count(&self.db)
            .await
            .map_err(db_error)
    }
}
