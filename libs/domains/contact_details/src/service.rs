use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ContactDetailsError, ContactDetailsResult};
use crate::locks::RecordLocks;
use crate::models::{ContactDetails, ContactDetailsDto, EMAIL_VERIFIED_FIELD, validate_email};
use crate::permission::{PermissionGate, ensure_can_manage};
use crate::repository::ContactDetailsRepository;

/// Result of an upsert, with enough context to decide on verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub details: ContactDetails,
    pub previous_email: Option<String>,
    pub created: bool,
}

impl UpsertOutcome {
    pub fn email_changed(&self) -> bool {
        self.previous_email != self.details.email
    }
}

/// Service layer for contact details.
///
/// Guarantees the persisted record and rejects invariant-breaking input.
/// Verification of a changed address is started by the caller.
pub struct ContactDetailsService<C: ContactDetailsRepository> {
    repository: Arc<C>,
    permissions: Arc<dyn PermissionGate>,
    locks: RecordLocks,
}

impl<C: ContactDetailsRepository> Clone for ContactDetailsService<C> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            permissions: Arc::clone(&self.permissions),
            locks: self.locks.clone(),
        }
    }
}

impl<C: ContactDetailsRepository> ContactDetailsService<C> {
    pub fn new(repository: Arc<C>, permissions: Arc<dyn PermissionGate>, locks: RecordLocks) -> Self {
        Self {
            repository,
            permissions,
            locks,
        }
    }

    pub async fn get(&self, user_id: Uuid) -> ContactDetailsResult<ContactDetails> {
        ensure_can_manage(self.permissions.as_ref(), user_id).await?;

        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or(ContactDetailsError::NotFound(user_id))
    }

    /// Create or update the record of `user_id` from `requested`.
    ///
    /// `requested.emailDetails.emailVerified` must equal the stored flag
    /// (false for a new record). A changed address is stored unverified.
    pub async fn upsert(
        &self,
        user_id: Uuid,
        requested: ContactDetailsDto,
    ) -> ContactDetailsResult<UpsertOutcome> {
        self.check_request(user_id, &requested).await?;

        let _guard = self.locks.lock(user_id).await;
        self.upsert_locked(user_id, requested).await
    }

    /// Checks that need no stored state: permission, body id, email format.
    pub(crate) async fn check_request(
        &self,
        user_id: Uuid,
        requested: &ContactDetailsDto,
    ) -> ContactDetailsResult<()> {
        ensure_can_manage(self.permissions.as_ref(), user_id).await?;

        if let Some(body_id) = requested.reference_data_user_id {
            if body_id != user_id {
                return Err(ContactDetailsError::IdMismatch {
                    expected: user_id,
                    actual: body_id,
                });
            }
        }

        if let Some(ref email) = requested.requested_email() {
            validate_email(email)?;
        }
        Ok(())
    }

    /// Merge and persist. The caller holds the record lock of `user_id`.
    pub(crate) async fn upsert_locked(
        &self,
        user_id: Uuid,
        requested: ContactDetailsDto,
    ) -> ContactDetailsResult<UpsertOutcome> {
        let email = requested.requested_email();
        let existing = self.repository.find_by_id(user_id).await?;
        let stored_verified = existing.as_ref().is_some_and(|d| d.email_verified);

        if requested.requested_email_verified() != stored_verified {
            return Err(ContactDetailsError::FieldIsInvariant(EMAIL_VERIFIED_FIELD));
        }

        let created = existing.is_none();
        let mut details = existing.unwrap_or_else(|| ContactDetails::new(user_id));
        let previous_email = details.email.take();

        details.phone_number = requested
            .phone_number
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        details.allow_notify = requested.allow_notify;
        details.email = email;

        if details.email != previous_email {
            details.email_verified = false;
        }

        let details = self.repository.save(details).await?;

        tracing::info!(user_id = %user_id, created, "Contact details saved");
        Ok(UpsertOutcome {
            details,
            previous_email,
            created,
        })
    }
}
