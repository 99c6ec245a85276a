use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(pk_uuid(Notifications::Id))
                    .col(uuid(Notifications::UserId))
                    .col(json_binary(Notifications::Channels).default("[]"))
                    .col(text(Notifications::Subject))
                    .col(text(Notifications::Body))
                    .col(
                        timestamp_with_time_zone(Notifications::CreatedDate)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_user_id")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .to_owned(),
            )
            .await?;

        // Pending rows point at their notification; removing a pending row
        // leaves the notification alone, removing the notification drops it.
        manager
            .create_table(
                Table::create()
                    .table(PendingNotifications::Table)
                    .if_not_exists()
                    .col(pk_uuid(PendingNotifications::NotificationId))
                    .col(json_binary(PendingNotifications::Channels).default("[]"))
                    .col(
                        timestamp_with_time_zone(PendingNotifications::CreatedDate)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pending_notifications_notification")
                            .from(
                                PendingNotifications::Table,
                                PendingNotifications::NotificationId,
                            )
                            .to(Notifications::Table, Notifications::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pending_notifications_created_date")
                    .table(PendingNotifications::Table)
                    .col(PendingNotifications::CreatedDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PendingNotifications::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    UserId,
    Channels,
    Subject,
    Body,
    CreatedDate,
}

#[derive(DeriveIden)]
enum PendingNotifications {
    Table,
    NotificationId,
    Channels,
    CreatedDate,
}
