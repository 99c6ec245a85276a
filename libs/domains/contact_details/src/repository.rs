use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ContactDetailsError, ContactDetailsResult};
use crate::models::{ContactDetails, EmailVerificationToken};

/// Repository trait for ContactDetails persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactDetailsRepository: Send + Sync {
    async fn find_by_id(&self, user_id: Uuid) -> ContactDetailsResult<Option<ContactDetails>>;

    /// Insert or replace the record for `details.reference_data_user_id`.
    ///
    /// Fails with `DuplicateEmail` when another record holds the same email.
    async fn save(&self, details: ContactDetails) -> ContactDetailsResult<ContactDetails>;

    async fn exists(&self, user_id: Uuid) -> ContactDetailsResult<bool>;
}

/// Repository trait for verification tokens.
///
/// Holds at most one token per contact details record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VerificationTokenRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> ContactDetailsResult<Option<EmailVerificationToken>>;

    async fn find_by_contact_details(
        &self,
        user_id: Uuid,
    ) -> ContactDetailsResult<Option<EmailVerificationToken>>;

    /// Store `token`, superseding any token of the same record in one step.
    async fn replace_for_contact_details(
        &self,
        token: EmailVerificationToken,
    ) -> ContactDetailsResult<EmailVerificationToken>;

    async fn delete(&self, id: Uuid) -> ContactDetailsResult<bool>;

    async fn delete_by_contact_details(&self, user_id: Uuid) -> ContactDetailsResult<bool>;

    /// Remove tokens whose expiration date is at or before `now`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> ContactDetailsResult<u64>;
}

/// In-memory implementation of ContactDetailsRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryContactDetailsRepository {
    records: Arc<RwLock<HashMap<Uuid, ContactDetails>>>,
}

impl InMemoryContactDetailsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactDetailsRepository for InMemoryContactDetailsRepository {
    async fn find_by_id(&self, user_id: Uuid) -> ContactDetailsResult<Option<ContactDetails>> {
        let records = self.records.read().await;
        Ok(records.get(&user_id).cloned())
    }

    async fn save(&self, details: ContactDetails) -> ContactDetailsResult<ContactDetails> {
        let mut records = self.records.write().await;

        if let Some(email) = details.email.as_deref() {
            let taken = records.values().any(|other| {
                other.reference_data_user_id != details.reference_data_user_id
                    && other.email.as_deref() == Some(email)
            });

            if taken {
                return Err(ContactDetailsError::DuplicateEmail(email.to_string()));
            }
        }

        records.insert(details.reference_data_user_id, details.clone());

        tracing::debug!(user_id = %details.reference_data_user_id, "Saved contact details");
        Ok(details)
    }

    async fn exists(&self, user_id: Uuid) -> ContactDetailsResult<bool> {
        Ok(self.records.read().await.contains_key(&user_id))
    }
}

/// In-memory token store keyed by owning record, so replacement is one insert.
#[derive(Debug, Default, Clone)]
pub struct InMemoryVerificationTokenRepository {
    tokens: Arc<RwLock<HashMap<Uuid, EmailVerificationToken>>>,
}

impl InMemoryVerificationTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VerificationTokenRepository for InMemoryVerificationTokenRepository {
    async fn find_by_id(&self, id: Uuid) -> ContactDetailsResult<Option<EmailVerificationToken>> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().find(|t| t.id == id).cloned())
    }

    async fn find_by_contact_details(
        &self,
        user_id: Uuid,
    ) -> ContactDetailsResult<Option<EmailVerificationToken>> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(&user_id).cloned())
    }

    async fn replace_for_contact_details(
        &self,
        token: EmailVerificationToken,
    ) -> ContactDetailsResult<EmailVerificationToken> {
        let mut tokens = self.tokens.write().await;
        tokens.insert(token.contact_details_id, token.clone());
        Ok(token)
    }

    async fn delete(&self, id: Uuid) -> ContactDetailsResult<bool> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| t.id != id);
        Ok(tokens.len() < before)
    }

    async fn delete_by_contact_details(&self, user_id: Uuid) -> ContactDetailsResult<bool> {
        Ok(self.tokens.write().await.remove(&user_id).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> ContactDetailsResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| !t.is_expired_at(now));
        Ok((before - tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn with_email(email: &str) -> ContactDetails {
        let mut details = ContactDetails::new(Uuid::new_v4());
        details.email = Some(email.to_string());
        details
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = InMemoryContactDetailsRepository::new();
        let details = with_email("a@x.com");

        repo.save(details.clone()).await.unwrap();

        assert!(repo.exists(details.reference_data_user_id).await.unwrap());
        assert_eq!(
            repo.find_by_id(details.reference_data_user_id).await.unwrap(),
            Some(details)
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_across_users() {
        let repo = InMemoryContactDetailsRepository::new();
        repo.save(with_email("a@x.com")).await.unwrap();

        let result = repo.save(with_email("a@x.com")).await;
        assert!(matches!(result, Err(ContactDetailsError::DuplicateEmail(e)) if e == "a@x.com"));
    }

    #[tokio::test]
    async fn test_resaving_own_email_is_allowed() {
        let repo = InMemoryContactDetailsRepository::new();
        let mut details = repo.save(with_email("a@x.com")).await.unwrap();
        details.phone_number = Some("555".into());

        assert!(repo.save(details).await.is_ok());
    }

    #[tokio::test]
    async fn test_replace_keeps_one_token_per_record() {
        let repo = InMemoryVerificationTokenRepository::new();
        let owner = Uuid::new_v4();
        let now = Utc::now();

        let first = EmailVerificationToken::issue(owner, "a@x.com", Duration::hours(1), now);
        let second = EmailVerificationToken::issue(owner, "b@x.com", Duration::hours(1), now);
        repo.replace_for_contact_details(first.clone()).await.unwrap();
        repo.replace_for_contact_details(second.clone()).await.unwrap();

        assert_eq!(repo.find_by_id(first.id).await.unwrap(), None);
        assert_eq!(
            repo.find_by_contact_details(owner).await.unwrap(),
            Some(second)
        );
    }

    #[tokio::test]
    async fn test_delete_expired_only_removes_expired() {
        let repo = InMemoryVerificationTokenRepository::new();
        let now = Utc::now();

        let expired =
            EmailVerificationToken::issue(Uuid::new_v4(), "a@x.com", Duration::hours(-1), now);
        let live = EmailVerificationToken::issue(Uuid::new_v4(), "b@x.com", Duration::hours(1), now);
        repo.replace_for_contact_details(expired.clone()).await.unwrap();
        repo.replace_for_contact_details(live.clone()).await.unwrap();

        assert_eq!(repo.delete_expired(now).await.unwrap(), 1);
        assert_eq!(repo.find_by_id(expired.id).await.unwrap(), None);
        assert_eq!(repo.find_by_id(live.id).await.unwrap(), Some(live));
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let repo = InMemoryVerificationTokenRepository::new();
        let token =
            EmailVerificationToken::issue(Uuid::new_v4(), "a@x.com", Duration::hours(1), Utc::now());
        repo.replace_for_contact_details(token.clone()).await.unwrap();

        assert!(repo.delete(token.id).await.unwrap());
        assert!(!repo.delete(token.id).await.unwrap());
        assert!(!repo.delete_by_contact_details(token.contact_details_id).await.unwrap());
    }
}
