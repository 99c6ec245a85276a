use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserContactDetails::Table)
                    .if_not_exists()
                    .col(pk_uuid(UserContactDetails::ReferenceDataUserId))
                    .col(text_null(UserContactDetails::Email))
                    .col(boolean(UserContactDetails::EmailVerified).default(false))
                    .col(text_null(UserContactDetails::PhoneNumber))
                    .col(boolean(UserContactDetails::AllowNotify).default(true))
                    .col(
                        timestamp_with_time_zone(UserContactDetails::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(UserContactDetails::UpdatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // The repository maps violations of this index to DuplicateEmail by name.
        manager
            .create_index(
                Index::create()
                    .name("unq_contact_details_email")
                    .table(UserContactDetails::Table)
                    .col(UserContactDetails::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserContactDetails::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum UserContactDetails {
    Table,
    ReferenceDataUserId,
    Email,
    EmailVerified,
    PhoneNumber,
    AllowNotify,
    CreatedAt,
    UpdatedAt,
}
