use async_trait::async_trait;
use chrono::{DateTime, Utc};
use database::postgres::unique_violation_on;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    entity::{contact_details, verification_token},
    error::{ContactDetailsError, ContactDetailsResult},
    models::{ContactDetails, EmailVerificationToken},
    repository::{ContactDetailsRepository, VerificationTokenRepository},
};

/// Unique index on `user_contact_details.email`
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "unq_contact_details_email";

fn db_error(e: sea_orm::DbErr) -> ContactDetailsError {
    ContactDetailsError::Database(e.to_string())
}

pub struct PgContactDetailsRepository {
    db: DatabaseConnection,
}

impl PgContactDetailsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactDetailsRepository for PgContactDetailsRepository {
    async fn find_by_id(&self, user_id: Uuid) -> ContactDetailsResult<Option<ContactDetails>> {
        let model = contact_details::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn save(&self, details: ContactDetails) -> ContactDetailsResult<ContactDetails> {
        let active_model = contact_details::ActiveModel::from(&details);

        contact_details::Entity::insert(active_model)
            .on_conflict(
                OnConflict::column(contact_details::Column::ReferenceDataUserId)
                    .update_columns([
                        contact_details::Column::Email,
                        contact_details::Column::EmailVerified,
                        contact_details::Column::PhoneNumber,
                        contact_details::Column::AllowNotify,
                        contact_details::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| {
                if unique_violation_on(&e, EMAIL_UNIQUE_CONSTRAINT) {
                    ContactDetailsError::DuplicateEmail(details.email.clone().unwrap_or_default())
                } else {
                    db_error(e)
                }
            })?;

        tracing::debug!(user_id = %details.reference_data_user_id, "Saved contact details");
        Ok(details)
    }

    async fn exists(&self, user_id: Uuid) -> ContactDetailsResult<bool> {
        let count = contact_details::Entity::find_by_id(user_id)
            .count(&self.db)
            .await
            .map_err(db_error)?;

        Ok(count > 0)
    }
}

pub struct PgVerificationTokenRepository {
    db: DatabaseConnection,
}

impl PgVerificationTokenRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VerificationTokenRepository for PgVerificationTokenRepository {
    async fn find_by_id(&self, id: Uuid) -> ContactDetailsResult<Option<EmailVerificationToken>> {
        let model = verification_token::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    async fn find_by_contact_details(
        &self,
        user_id: Uuid,
    ) -> ContactDetailsResult<Option<EmailVerificationToken>> {
        let model = verification_token::Entity::find()
            .filter(verification_token::Column::UserContactDetailsId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(db_error)?;

        Ok(model.map(Into::into))
    }

    /// `INSERT .. ON CONFLICT (user_contact_details_id) DO UPDATE`, backed by
    /// the unique index on the owner column.
    async fn replace_for_contact_details(
        &self,
        token: EmailVerificationToken,
    ) -> ContactDetailsResult<EmailVerificationToken> {
        verification_token::Entity::insert(verification_token::ActiveModel::from(&token))
            .on_conflict(
                OnConflict::column(verification_token::Column::UserContactDetailsId)
                    .update_columns([
                        verification_token::Column::Id,
                        verification_token::Column::EmailAddress,
                        verification_token::Column::ExpirationDate,
                        verification_token::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_error)?;

        Ok(token)
    }

    async fn delete(&self, id: Uuid) -> ContactDetailsResult<bool> {
        let result = verification_token::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn delete_by_contact_details(&self, user_id: Uuid) -> ContactDetailsResult<bool> {
        let result = verification_token::Entity::delete_many()
            .filter(verification_token::Column::UserContactDetailsId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> ContactDetailsResult<u64> {
        let result = verification_token::Entity::delete_many()
            .filter(verification_token::Column::ExpirationDate.lte(now))
            .exec(&self.db)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected)
    }
}
