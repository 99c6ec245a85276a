//! Outbound verification messages.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::EmailVerificationToken;

/// What a notifier needs to send one verification message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationDispatch {
    pub user_id: Uuid,
    pub token_id: Uuid,
    pub email_address: String,
    pub expiration_date: DateTime<Utc>,
}

impl From<&EmailVerificationToken> for VerificationDispatch {
    fn from(token: &EmailVerificationToken) -> Self {
        Self {
            user_id: token.contact_details_id,
            token_id: token.id,
            email_address: token.email_address.clone(),
            expiration_date: token.expiration_date,
        }
    }
}

#[derive(Debug, Error)]
#[error("Verification dispatch failed: {0}")]
pub struct DispatchError(pub String);

/// Delivers verification messages.
///
/// The workflow logs and swallows failures; a failed dispatch never undoes
/// token issuance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerificationNotifier: Send + Sync {
    async fn send_verification(&self, dispatch: VerificationDispatch) -> Result<(), DispatchError>;
}
