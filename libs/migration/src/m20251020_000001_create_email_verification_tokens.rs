use sea_orm_migration::{prelude::*, schema::*};

use crate::m20251020_000000_create_user_contact_details::UserContactDetails;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailVerificationTokens::Table)
                    .if_not_exists()
                    .col(pk_uuid(EmailVerificationTokens::Id))
                    .col(uuid(EmailVerificationTokens::UserContactDetailsId))
                    .col(text(EmailVerificationTokens::EmailAddress))
                    .col(timestamp_with_time_zone(
                        EmailVerificationTokens::ExpirationDate,
                    ))
                    .col(
                        timestamp_with_time_zone(EmailVerificationTokens::CreatedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_email_verification_tokens_contact_details")
                            .from(
                                EmailVerificationTokens::Table,
                                EmailVerificationTokens::UserContactDetailsId,
                            )
                            .to(
                                UserContactDetails::Table,
                                UserContactDetails::ReferenceDataUserId,
                            )
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One live token per contact details record; token issuance upserts on it.
        manager
            .create_index(
                Index::create()
                    .name("unq_email_verification_tokens_owner")
                    .table(EmailVerificationTokens::Table)
                    .col(EmailVerificationTokens::UserContactDetailsId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_email_verification_tokens_expiration_date")
                    .table(EmailVerificationTokens::Table)
                    .col(EmailVerificationTokens::ExpirationDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EmailVerificationTokens::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EmailVerificationTokens {
    Table,
    Id,
    UserContactDetailsId,
    EmailAddress,
    ExpirationDate,
    CreatedAt,
}
