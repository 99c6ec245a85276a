use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidateEmail};

use crate::error::{ContactDetailsError, ContactDetailsResult};

/// JSON path of the server-controlled verification flag.
pub const EMAIL_VERIFIED_FIELD: &str = "emailDetails.emailVerified";

/// Contact details of one user, keyed by the reference data user id.
///
/// `email_verified` is only ever true for the address that passed
/// verification last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub reference_data_user_id: Uuid,
    pub phone_number: Option<String>,
    pub allow_notify: bool,
    pub email: Option<String>,
    pub email_verified: bool,
}

impl ContactDetails {
    /// Fresh record: no email, unverified, notifications allowed.
    pub fn new(reference_data_user_id: Uuid) -> Self {
        Self {
            reference_data_user_id,
            phone_number: None,
            allow_notify: true,
            email: None,
            email_verified: false,
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.is_empty())
    }

    pub fn has_email(&self) -> bool {
        self.email().is_some()
    }

    pub(crate) fn mark_verified(&mut self, email: String) {
        self.email = Some(email);
        self.email_verified = true;
    }
}

/// One-time credential proving control of `email_address`.
///
/// The id doubles as the secret in the verification link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailVerificationToken {
    pub id: Uuid,
    pub contact_details_id: Uuid,
    pub email_address: String,
    pub expiration_date: DateTime<Utc>,
}

impl EmailVerificationToken {
    pub fn issue(
        contact_details_id: Uuid,
        email_address: impl Into<String>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            // v4 ids are random; v7 would leak issuance time
            id: Uuid::new_v4(),
            contact_details_id,
            email_address: email_address.into(),
            expiration_date: now + ttl,
        }
    }

    /// Expired at or after `expiration_date`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration_date
    }
}

/// Trim and drop empty addresses.
pub(crate) fn normalize_email(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}

/// `EmailInvalid` unless `email` is a syntactically valid address.
pub(crate) fn validate_email(email: &str) -> ContactDetailsResult<()> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(ContactDetailsError::EmailInvalid(email.to_string()))
    }
}

fn default_allow_notify() -> bool {
    true
}

/// Contact details as exchanged over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetailsDto {
    /// Must match the path id when present
    #[serde(default)]
    pub reference_data_user_id: Option<Uuid>,
    #[validate(length(max = 32))]
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default = "default_allow_notify")]
    pub allow_notify: bool,
    #[serde(default)]
    pub email_details: Option<EmailDetailsDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailDetailsDto {
    #[serde(default)]
    pub email: Option<String>,
    /// Server-controlled; must equal the stored value
    #[serde(default)]
    pub email_verified: bool,
}

impl ContactDetailsDto {
    pub fn requested_email(&self) -> Option<String> {
        normalize_email(
            self.email_details
                .as_ref()
                .and_then(|details| details.email.as_deref()),
        )
    }

    pub fn requested_email_verified(&self) -> bool {
        self.email_details
            .as_ref()
            .is_some_and(|details| details.email_verified)
    }
}

impl From<&ContactDetails> for ContactDetailsDto {
    fn from(details: &ContactDetails) -> Self {
        let email_details = details.email.as_ref().map(|email| EmailDetailsDto {
            email: Some(email.clone()),
            email_verified: details.email_verified,
        });

        Self {
            reference_data_user_id: Some(details.reference_data_user_id),
            phone_number: details.phone_number.clone(),
            allow_notify: details.allow_notify,
            email_details,
        }
    }
}

/// The outstanding verification for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PendingVerificationDto {
    pub token: Uuid,
    pub email_address: String,
    pub expiration_date: DateTime<Utc>,
}

impl From<&EmailVerificationToken> for PendingVerificationDto {
    fn from(token: &EmailVerificationToken) -> Self {
        Self {
            token: token.id,
            email_address: token.email_address.clone(),
            expiration_date: token.expiration_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_token_expires_at_expiration_instant() {
        let now = Utc::now();
        let token = EmailVerificationToken::issue(Uuid::new_v4(), "a@x.com", Duration::hours(24), now);

        assert!(!token.is_expired_at(now));
        assert!(!token.is_expired_at(token.expiration_date - Duration::milliseconds(1)));
        assert!(token.is_expired_at(token.expiration_date));
        assert!(token.is_expired_at(token.expiration_date + Duration::seconds(1)));
    }

    #[test]
    fn test_issued_tokens_have_distinct_ids() {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        let a = EmailVerificationToken::issue(owner, "a@x.com", Duration::hours(1), now);
        let b = EmailVerificationToken::issue(owner, "a@x.com", Duration::hours(1), now);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_dto_defaults() {
        let dto: ContactDetailsDto = serde_json::from_value(json!({})).unwrap();
        assert!(dto.allow_notify);
        assert_eq!(dto.requested_email(), None);
        assert!(!dto.requested_email_verified());
    }

    #[test]
    fn test_dto_blank_email_is_none() {
        let dto: ContactDetailsDto = serde_json::from_value(json!({
            "emailDetails": { "email": "   ", "emailVerified": false }
        }))
        .unwrap();
        assert_eq!(dto.requested_email(), None);
    }

    #[test]
    fn test_dto_serializes_camel_case() {
        let mut details = ContactDetails::new(Uuid::nil());
        details.email = Some("a@x.com".into());
        details.phone_number = Some("555".into());

        let value = serde_json::to_value(ContactDetailsDto::from(&details)).unwrap();
        assert_eq!(
            value,
            json!({
                "referenceDataUserId": Uuid::nil(),
                "phoneNumber": "555",
                "allowNotify": true,
                "emailDetails": { "email": "a@x.com", "emailVerified": false }
            })
        );
    }

    #[test]
    fn test_email_syntax() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(matches!(
            validate_email("not-an-email"),
            Err(ContactDetailsError::EmailInvalid(e)) if e == "not-an-email"
        ));
        assert!(validate_email("a@").is_err());
    }

    #[test]
    fn test_phone_number_length_is_validated() {
        let dto = ContactDetailsDto {
            reference_data_user_id: None,
            phone_number: Some("1".repeat(33)),
            allow_notify: true,
            email_details: None,
        };
        assert!(dto.validate().is_err());
    }
}
