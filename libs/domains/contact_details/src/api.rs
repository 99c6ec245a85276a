use axum_helpers::AcceptLanguage;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::VerificationConfig;
use crate::error::ContactDetailsResult;
use crate::locks::RecordLocks;
use crate::messages::Locale;
use crate::models::{ContactDetails, ContactDetailsDto, EmailVerificationToken};
use crate::notifier::VerificationNotifier;
use crate::permission::PermissionGate;
use crate::repository::{ContactDetailsRepository, VerificationTokenRepository};
use crate::service::{ContactDetailsService, UpsertOutcome};
use crate::workflow::EmailVerificationWorkflow;

/// Service and workflow sharing one set of repositories and record locks.
pub struct ContactDetailsApi<C, T>
where
    C: ContactDetailsRepository,
    T: VerificationTokenRepository,
{
    service: ContactDetailsService<C>,
    workflow: EmailVerificationWorkflow<C, T>,
    locks: RecordLocks,
    default_locale: Locale,
}

impl<C, T> Clone for ContactDetailsApi<C, T>
where
    C: ContactDetailsRepository,
    T: VerificationTokenRepository,
{
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            workflow: self.workflow.clone(),
            locks: self.locks.clone(),
            default_locale: self.default_locale,
        }
    }
}

impl<C, T> ContactDetailsApi<C, T>
where
    C: ContactDetailsRepository,
    T: VerificationTokenRepository,
{
    pub fn new(
        contacts: C,
        tokens: T,
        permissions: Arc<dyn PermissionGate>,
        notifier: Arc<dyn VerificationNotifier>,
        config: VerificationConfig,
        default_locale: Locale,
    ) -> Self {
        let contacts = Arc::new(contacts);
        let locks = RecordLocks::new();

        let service =
            ContactDetailsService::new(Arc::clone(&contacts), Arc::clone(&permissions), locks.clone());
        let workflow = EmailVerificationWorkflow::new(
            contacts,
            Arc::new(tokens),
            permissions,
            notifier,
            locks.clone(),
            config.token_ttl,
        );

        Self {
            service,
            workflow,
            locks,
            default_locale,
        }
    }

    pub fn service(&self) -> &ContactDetailsService<C> {
        &self.service
    }

    pub fn workflow(&self) -> &EmailVerificationWorkflow<C, T> {
        &self.workflow
    }

    /// First supported language of the request, else the configured default.
    pub fn locale(&self, accept: &AcceptLanguage) -> Locale {
        Locale::negotiate(accept.0.as_slice(), self.default_locale)
    }

    /// Upsert the record, then start or cancel verification of its address.
    ///
    /// A new address gets a fresh token; removing the address drops any
    /// pending one. Both happen under one record lock, so the live token
    /// always targets the address of the latest accepted request. Once the
    /// record is stored the request succeeds even if the token step fails.
    pub async fn save_contact_details(
        &self,
        user_id: Uuid,
        requested: ContactDetailsDto,
    ) -> ContactDetailsResult<UpsertOutcome> {
        self.service.check_request(user_id, &requested).await?;

        let (outcome, issued) = {
            let _guard = self.locks.lock(user_id).await;
            let outcome = self.service.upsert_locked(user_id, requested).await?;
            let issued = self.restart_verification(&outcome).await;
            (outcome, issued)
        };

        if let Some(token) = issued {
            self.workflow.dispatch(&token).await;
        }
        Ok(outcome)
    }

    /// Runs under the record lock taken by `save_contact_details`.
    async fn restart_verification(&self, outcome: &UpsertOutcome) -> Option<EmailVerificationToken> {
        if !outcome.email_changed() {
            return None;
        }

        let user_id = outcome.details.reference_data_user_id;
        let result = match outcome.details.email() {
            Some(email) => self.workflow.issue_locked(user_id, email.to_string()).await.map(Some),
            None => self.workflow.discard_locked(user_id).await.map(|_| None),
        };

        match result {
            Ok(issued) => issued,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Verification not restarted after update");

                // A token for the superseded address must not stay redeemable.
                if let Err(e) = self.workflow.discard_locked(user_id).await {
                    tracing::warn!(user_id = %user_id, error = %e, "Stale verification token kept");
                }
                None
            }
        }
    }

    pub async fn get_contact_details(&self, user_id: Uuid) -> ContactDetailsResult<ContactDetails> {
        self.service.get(user_id).await
    }
}
