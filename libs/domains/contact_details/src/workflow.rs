//! Email verification state machine.
//!
//! A contact details record is either unverified (possibly with one pending
//! token) or verified. The only way to become verified is
//! [`EmailVerificationWorkflow::complete_verification`] with a live token.

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ContactDetailsError, ContactDetailsResult};
use crate::locks::RecordLocks;
use crate::models::{ContactDetails, EmailVerificationToken, validate_email};
use crate::notifier::VerificationNotifier;
use crate::permission::{PermissionGate, ensure_can_manage};
use crate::repository::{ContactDetailsRepository, VerificationTokenRepository};

pub struct EmailVerificationWorkflow<C, T>
where
    C: ContactDetailsRepository,
    T: VerificationTokenRepository,
{
    contacts: Arc<C>,
    tokens: Arc<T>,
    permissions: Arc<dyn PermissionGate>,
    notifier: Arc<dyn VerificationNotifier>,
    locks: RecordLocks,
    token_ttl: Duration,
}

impl<C, T> Clone for EmailVerificationWorkflow<C, T>
where
    C: ContactDetailsRepository,
    T: VerificationTokenRepository,
{
    fn clone(&self) -> Self {
        Self {
            contacts: Arc::clone(&self.contacts),
            tokens: Arc::clone(&self.tokens),
            permissions: Arc::clone(&self.permissions),
            notifier: Arc::clone(&self.notifier),
            locks: self.locks.clone(),
            token_ttl: self.token_ttl,
        }
    }
}

impl<C, T> EmailVerificationWorkflow<C, T>
where
    C: ContactDetailsRepository,
    T: VerificationTokenRepository,
{
    pub fn new(
        contacts: Arc<C>,
        tokens: Arc<T>,
        permissions: Arc<dyn PermissionGate>,
        notifier: Arc<dyn VerificationNotifier>,
        locks: RecordLocks,
        token_ttl: Duration,
    ) -> Self {
        Self {
            contacts,
            tokens,
            permissions,
            notifier,
            locks,
            token_ttl,
        }
    }

    /// Issue a token for `new_email`, superseding any pending one, and send it.
    ///
    /// The contact details record itself is left untouched. The message is
    /// sent after the record lock is released.
    pub async fn issue_token(
        &self,
        contact: &ContactDetails,
        new_email: &str,
    ) -> ContactDetailsResult<EmailVerificationToken> {
        let user_id = contact.reference_data_user_id;
        ensure_can_manage(self.permissions.as_ref(), user_id).await?;
        validate_email(new_email)?;

        let token = {
            let _guard = self.locks.lock(user_id).await;
            self.issue_locked(user_id, new_email.to_string()).await?
        };

        self.dispatch(&token).await;
        Ok(token)
    }

    /// Consume `token_id` for `user_id` and mark the token's address verified.
    ///
    /// Checks, in order: the token exists, it belongs to `user_id`, it has
    /// not expired. The record is saved before the token is deleted.
    pub async fn complete_verification(
        &self,
        user_id: Uuid,
        token_id: Uuid,
    ) -> ContactDetailsResult<ContactDetails> {
        let _guard = self.locks.lock(user_id).await;

        let token = self
            .tokens
            .find_by_id(token_id)
            .await?
            .ok_or(ContactDetailsError::TokenInvalid(token_id))?;

        if token.contact_details_id != user_id {
            return Err(ContactDetailsError::IdMismatch {
                expected: token_id,
                actual: user_id,
            });
        }

        if token.is_expired_at(Utc::now()) {
            return Err(ContactDetailsError::TokenExpired(token_id));
        }

        let mut contact = self
            .contacts
            .find_by_id(user_id)
            .await?
            .ok_or(ContactDetailsError::NotFound(user_id))?;

        contact.mark_verified(token.email_address);
        let contact = self.contacts.save(contact).await?;

        self.tokens.delete(token.id).await?;

        tracing::info!(user_id = %user_id, "Email address verified");
        Ok(contact)
    }

    /// Re-issue the pending verification, reusing its target address.
    pub async fn resend_verification(
        &self,
        user_id: Uuid,
    ) -> ContactDetailsResult<EmailVerificationToken> {
        ensure_can_manage(self.permissions.as_ref(), user_id).await?;

        let token = {
            let _guard = self.locks.lock(user_id).await;

            let contact = self
                .contacts
                .find_by_id(user_id)
                .await?
                .ok_or(ContactDetailsError::NotFound(user_id))?;

            if !contact.has_email() {
                return Err(ContactDetailsError::NoEmailOnFile(user_id));
            }

            if contact.email_verified {
                return Err(ContactDetailsError::AlreadyVerified(user_id));
            }

            let pending = self
                .tokens
                .find_by_contact_details(user_id)
                .await?
                .ok_or(ContactDetailsError::NotFound(user_id))?;

            self.issue_locked(user_id, pending.email_address).await?
        };

        self.dispatch(&token).await;
        Ok(token)
    }

    /// The stored token for `user_id`, expired or not.
    pub async fn get_pending_verification(
        &self,
        user_id: Uuid,
    ) -> ContactDetailsResult<Option<EmailVerificationToken>> {
        ensure_can_manage(self.permissions.as_ref(), user_id).await?;

        if !self.contacts.exists(user_id).await? {
            return Err(ContactDetailsError::NotFound(user_id));
        }

        self.tokens.find_by_contact_details(user_id).await
    }

    /// Drop the pending token of `user_id`, if any.
    pub async fn discard_pending(&self, user_id: Uuid) -> ContactDetailsResult<bool> {
        let _guard = self.locks.lock(user_id).await;
        self.discard_locked(user_id).await
    }

    pub(crate) async fn discard_locked(&self, user_id: Uuid) -> ContactDetailsResult<bool> {
        let removed = self.tokens.delete_by_contact_details(user_id).await?;

        if removed {
            tracing::info!(user_id = %user_id, "Pending verification discarded");
        }
        Ok(removed)
    }

    /// Delete every expired token. Returns how many were removed.
    pub async fn purge_expired(&self) -> ContactDetailsResult<u64> {
        let removed = self.tokens.delete_expired(Utc::now()).await?;

        if removed > 0 {
            tracing::info!(removed, "Purged expired verification tokens");
        }
        Ok(removed)
    }

    /// Store a fresh token for `email`. The caller holds the record lock.
    pub(crate) async fn issue_locked(
        &self,
        user_id: Uuid,
        email: String,
    ) -> ContactDetailsResult<EmailVerificationToken> {
        let token = EmailVerificationToken::issue(user_id, email, self.token_ttl, Utc::now());
        let token = self.tokens.replace_for_contact_details(token).await?;

        tracing::info!(
            user_id = %user_id,
            expiration_date = %token.expiration_date,
            "Verification token issued"
        );
        Ok(token)
    }

    /// Best effort: a failed dispatch is logged and the token stays valid.
    pub(crate) async fn dispatch(&self, token: &EmailVerificationToken) {
        if let Err(e) = self.notifier.send_verification(token.into()).await {
            tracing::warn!(
                user_id = %token.contact_details_id,
                error = %e,
                "Verification email not dispatched"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::{DispatchError, MockVerificationNotifier, VerificationDispatch};
    use std::time::Duration as StdDuration;
    use tokio::sync::Notify;
    use crate::permission::{AllowAll, MockPermissionGate};
    use crate::repository::{InMemoryContactDetailsRepository, InMemoryVerificationTokenRepository};

    type Workflow =
        EmailVerificationWorkflow<InMemoryContactDetailsRepository, InMemoryVerificationTokenRepository>;

    struct Fixture {
        contacts: Arc<InMemoryContactDetailsRepository>,
        tokens: Arc<InMemoryVerificationTokenRepository>,
        workflow: Workflow,
    }

    fn silent_notifier() -> MockVerificationNotifier {
        let mut notifier = MockVerificationNotifier::new();
        notifier.expect_send_verification().returning(|_| Ok(()));
        notifier
    }

    fn fixture_with(
        permissions: Arc<dyn PermissionGate>,
        notifier: impl VerificationNotifier + 'static,
    ) -> Fixture {
        let contacts = Arc::new(InMemoryContactDetailsRepository::new());
        let tokens = Arc::new(InMemoryVerificationTokenRepository::new());
        let workflow = EmailVerificationWorkflow::new(
            contacts.clone(),
            tokens.clone(),
            permissions,
            Arc::new(notifier),
            RecordLocks::new(),
            Duration::hours(24),
        );
        Fixture {
            contacts,
            tokens,
            workflow,
        }
    }

    /// Parks inside `send_verification` until released.
    struct StalledNotifier {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait::async_trait]
    impl VerificationNotifier for StalledNotifier {
        async fn send_verification(&self, _: VerificationDispatch) -> Result<(), DispatchError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(())
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(AllowAll), silent_notifier())
    }

    async fn stored(fixture: &Fixture, email: Option<&str>, verified: bool) -> ContactDetails {
        let mut details = ContactDetails::new(Uuid::new_v4());
        details.email = email.map(str::to_string);
        details.email_verified = verified;
        fixture.contacts.save(details).await.unwrap()
    }

    #[tokio::test]
    async fn test_issue_then_complete_verifies_once() {
        let f = fixture();
        let user = stored(&f, None, false).await;

        let token = f.workflow.issue_token(&user, "a@x.com").await.unwrap();
        assert_eq!(token.contact_details_id, user.reference_data_user_id);
        assert!(f.contacts.find_by_id(user.reference_data_user_id).await.unwrap().unwrap().email.is_none());

        let verified = f
            .workflow
            .complete_verification(user.reference_data_user_id, token.id)
            .await
            .unwrap();
        assert_eq!(verified.email.as_deref(), Some("a@x.com"));
        assert!(verified.email_verified);
        assert_eq!(f.tokens.find_by_id(token.id).await.unwrap(), None);

        let again = f
            .workflow
            .complete_verification(user.reference_data_user_id, token.id)
            .await;
        assert!(matches!(again, Err(ContactDetailsError::TokenInvalid(id)) if id == token.id));
    }

    #[tokio::test]
    async fn test_second_issue_supersedes_first() {
        let f = fixture();
        let user = stored(&f, None, false).await;

        let first = f.workflow.issue_token(&user, "a@x.com").await.unwrap();
        let second = f.workflow.issue_token(&user, "b@x.com").await.unwrap();

        let pending = f
            .tokens
            .find_by_contact_details(user.reference_data_user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pending.id, second.id);
        assert_eq!(pending.email_address, "b@x.com");
        assert_eq!(f.tokens.find_by_id(first.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_concurrent_issues_leave_one_token() {
        let f = fixture();
        let user = stored(&f, None, false).await;

        let issued = futures::future::join_all((0..16).map(|i| {
            let workflow = f.workflow.clone();
            let user = user.clone();
            async move { workflow.issue_token(&user, &format!("u{i}@x.com")).await.unwrap() }
        }))
        .await;

        let pending = f
            .tokens
            .find_by_contact_details(user.reference_data_user_id)
            .await
            .unwrap()
            .unwrap();
        let live: Vec<_> = issued.iter().filter(|t| t.id == pending.id).collect();
        assert_eq!(live.len(), 1);
    }

    #[tokio::test]
    async fn test_issue_rejects_invalid_email() {
        let f = fixture();
        let user = stored(&f, None, false).await;

        let result = f.workflow.issue_token(&user, "nope").await;
        assert!(matches!(result, Err(ContactDetailsError::EmailInvalid(_))));
    }

    #[tokio::test]
    async fn test_issue_requires_permission() {
        let mut gate = MockPermissionGate::new();
        gate.expect_can_manage().returning(|_| false);
        let mut notifier = MockVerificationNotifier::new();
        notifier.expect_send_verification().never();
        let f = fixture_with(Arc::new(gate), notifier);
        let user = stored(&f, None, false).await;

        let result = f.workflow.issue_token(&user, "a@x.com").await;
        assert!(matches!(result, Err(ContactDetailsError::PermissionDenied(_))));
        assert_eq!(
            f.tokens.find_by_contact_details(user.reference_data_user_id).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_dispatch_failure_keeps_token() {
        let mut notifier = MockVerificationNotifier::new();
        notifier
            .expect_send_verification()
            .times(1)
            .returning(|_| Err(DispatchError("smtp down".into())));
        let f = fixture_with(Arc::new(AllowAll), notifier);
        let user = stored(&f, None, false).await;

        let token = f.workflow.issue_token(&user, "a@x.com").await.unwrap();
        assert_eq!(f.tokens.find_by_id(token.id).await.unwrap(), Some(token));
    }

    #[tokio::test]
    async fn test_slow_dispatch_does_not_block_verification() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let f = fixture_with(
            Arc::new(AllowAll),
            StalledNotifier {
                entered: entered.clone(),
                release: release.clone(),
            },
        );
        let user = stored(&f, None, false).await;
        let user_id = user.reference_data_user_id;

        let issuing = {
            let workflow = f.workflow.clone();
            tokio::spawn(async move { workflow.issue_token(&user, "a@x.com").await })
        };
        entered.notified().await;

        let token = f.tokens.find_by_contact_details(user_id).await.unwrap().unwrap();
        let verified = tokio::time::timeout(
            StdDuration::from_secs(1),
            f.workflow.complete_verification(user_id, token.id),
        )
        .await
        .expect("verification waited on dispatch")
        .unwrap();
        assert!(verified.email_verified);

        release.notify_one();
        assert_eq!(issuing.await.unwrap().unwrap().id, token.id);
    }

    #[tokio::test]
    async fn test_dispatch_carries_token_and_address() {
        let mut notifier = MockVerificationNotifier::new();
        notifier
            .expect_send_verification()
            .withf(|d| d.email_address == "a@x.com")
            .times(1)
            .returning(|_| Ok(()));
        let f = fixture_with(Arc::new(AllowAll), notifier);
        let user = stored(&f, None, false).await;

        f.workflow.issue_token(&user, "a@x.com").await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected_without_mutation() {
        let f = fixture();
        let user = stored(&f, Some("old@x.com"), false).await;
        let token = EmailVerificationToken::issue(
            user.reference_data_user_id,
            "new@x.com",
            Duration::hours(-1),
            Utc::now(),
        );
        f.tokens.replace_for_contact_details(token.clone()).await.unwrap();

        let result = f
            .workflow
            .complete_verification(user.reference_data_user_id, token.id)
            .await;

        assert!(matches!(result, Err(ContactDetailsError::TokenExpired(_))));
        assert_eq!(
            f.contacts.find_by_id(user.reference_data_user_id).await.unwrap(),
            Some(user)
        );
    }

    #[tokio::test]
    async fn test_foreign_token_is_id_mismatch() {
        let f = fixture();
        let owner = stored(&f, None, false).await;
        let other = stored(&f, None, false).await;
        let token = f.workflow.issue_token(&owner, "a@x.com").await.unwrap();

        let result = f
            .workflow
            .complete_verification(other.reference_data_user_id, token.id)
            .await;

        assert!(matches!(result, Err(ContactDetailsError::IdMismatch { .. })));
        assert_eq!(
            f.contacts.find_by_id(owner.reference_data_user_id).await.unwrap(),
            Some(owner)
        );
        assert_eq!(
            f.contacts.find_by_id(other.reference_data_user_id).await.unwrap(),
            Some(other)
        );
        assert!(f.tokens.find_by_id(token.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_mismatch_is_checked_before_expiry() {
        let f = fixture();
        let owner = stored(&f, None, false).await;
        let token = EmailVerificationToken::issue(
            owner.reference_data_user_id,
            "a@x.com",
            Duration::hours(-1),
            Utc::now(),
        );
        f.tokens.replace_for_contact_details(token.clone()).await.unwrap();

        let result = f.workflow.complete_verification(Uuid::new_v4(), token.id).await;
        assert!(matches!(result, Err(ContactDetailsError::IdMismatch { .. })));
    }

    #[tokio::test]
    async fn test_resend_preconditions() {
        let f = fixture();

        let missing = f.workflow.resend_verification(Uuid::new_v4()).await;
        assert!(matches!(missing, Err(ContactDetailsError::NotFound(_))));

        let no_email = stored(&f, None, false).await;
        let result = f.workflow.resend_verification(no_email.reference_data_user_id).await;
        assert!(matches!(result, Err(ContactDetailsError::NoEmailOnFile(_))));

        let verified = stored(&f, Some("v@x.com"), true).await;
        let result = f.workflow.resend_verification(verified.reference_data_user_id).await;
        assert!(matches!(result, Err(ContactDetailsError::AlreadyVerified(_))));

        let nothing_pending = stored(&f, Some("p@x.com"), false).await;
        let result = f
            .workflow
            .resend_verification(nothing_pending.reference_data_user_id)
            .await;
        assert!(matches!(result, Err(ContactDetailsError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_resend_reuses_token_address() {
        let f = fixture();
        let user = stored(&f, Some("current@x.com"), false).await;
        let first = f.workflow.issue_token(&user, "pending@x.com").await.unwrap();

        let resent = f
            .workflow
            .resend_verification(user.reference_data_user_id)
            .await
            .unwrap();

        assert_ne!(resent.id, first.id);
        assert_eq!(resent.email_address, "pending@x.com");
        assert_eq!(f.tokens.find_by_id(first.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resend_checks_permission_first() {
        let mut gate = MockPermissionGate::new();
        gate.expect_can_manage().times(1).returning(|_| false);
        let f = fixture_with(Arc::new(gate), silent_notifier());

        let result = f.workflow.resend_verification(Uuid::new_v4()).await;
        assert!(matches!(result, Err(ContactDetailsError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_pending_verification_lookup() {
        let f = fixture();

        let missing = f.workflow.get_pending_verification(Uuid::new_v4()).await;
        assert!(matches!(missing, Err(ContactDetailsError::NotFound(_))));

        let user = stored(&f, None, false).await;
        assert_eq!(
            f.workflow
                .get_pending_verification(user.reference_data_user_id)
                .await
                .unwrap(),
            None
        );

        let token = f.workflow.issue_token(&user, "a@x.com").await.unwrap();
        assert_eq!(
            f.workflow
                .get_pending_verification(user.reference_data_user_id)
                .await
                .unwrap(),
            Some(token)
        );
    }

    #[tokio::test]
    async fn test_purge_and_discard() {
        let f = fixture();
        let expired_owner = stored(&f, None, false).await;
        let live_owner = stored(&f, None, false).await;

        f.tokens
            .replace_for_contact_details(EmailVerificationToken::issue(
                expired_owner.reference_data_user_id,
                "a@x.com",
                Duration::hours(-1),
                Utc::now(),
            ))
            .await
            .unwrap();
        f.workflow.issue_token(&live_owner, "b@x.com").await.unwrap();

        assert_eq!(f.workflow.purge_expired().await.unwrap(), 1);
        assert!(f.workflow.discard_pending(live_owner.reference_data_user_id).await.unwrap());
        assert!(!f.workflow.discard_pending(live_owner.reference_data_user_id).await.unwrap());
    }
}
