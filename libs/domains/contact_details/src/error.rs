use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode, LocalizedError};
use thiserror::Error;
use uuid::Uuid;

use crate::messages::{Locale, MessageKey, resolve};

#[derive(Debug, Error)]
pub enum ContactDetailsError {
    #[error("Caller may not manage contact details of user {0}")]
    PermissionDenied(Uuid),

    #[error("Contact details not found for user {0}")]
    NotFound(Uuid),

    #[error("Invalid email address: {0}")]
    EmailInvalid(String),

    #[error("Email address '{0}' is already used by another user")]
    DuplicateEmail(String),

    #[error("Field '{0}' cannot be changed by clients")]
    FieldIsInvariant(&'static str),

    #[error("Verification token {0} is invalid")]
    TokenInvalid(Uuid),

    #[error("Verification token {0} has expired")]
    TokenExpired(Uuid),

    /// `actual` was supplied where `expected` was required.
    #[error("Id {actual} does not match {expected}")]
    IdMismatch { expected: Uuid, actual: Uuid },

    #[error("User {0} has no email address on file")]
    NoEmailOnFile(Uuid),

    #[error("Email address of user {0} is already verified")]
    AlreadyVerified(Uuid),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ContactDetailsResult<T> = Result<T, ContactDetailsError>;

impl ContactDetailsError {
    pub fn message_key(&self) -> MessageKey {
        match self {
            Self::PermissionDenied(_) => MessageKey::PermissionMissing,
            Self::NotFound(_) => MessageKey::UserContactDetailsNotFound,
            Self::EmailInvalid(_) => MessageKey::EmailInvalid,
            Self::DuplicateEmail(_) => MessageKey::EmailDuplicated,
            Self::FieldIsInvariant(_) => MessageKey::FieldIsInvariant,
            Self::TokenInvalid(_) => MessageKey::TokenInvalid,
            Self::TokenExpired(_) => MessageKey::TokenExpired,
            Self::IdMismatch { .. } => MessageKey::IdMismatch,
            Self::NoEmailOnFile(_) => MessageKey::UserHasNoEmail,
            Self::AlreadyVerified(_) => MessageKey::UserEmailAlreadyVerified,
            Self::Database(_) => MessageKey::DatabaseError,
            Self::Internal(_) => MessageKey::InternalError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            Self::PermissionDenied(_) => ErrorCode::Forbidden,
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::EmailInvalid(_) | Self::FieldIsInvariant(_) | Self::IdMismatch { .. } => {
                ErrorCode::ValidationError
            }
            Self::DuplicateEmail(_) => ErrorCode::Conflict,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Internal(_) => ErrorCode::InternalError,
            _ => ErrorCode::BadRequest,
        }
    }

    /// Message parameters. Storage details never reach the client.
    fn params(&self) -> Vec<String> {
        match self {
            Self::PermissionDenied(id)
            | Self::NotFound(id)
            | Self::NoEmailOnFile(id)
            | Self::AlreadyVerified(id)
            | Self::TokenInvalid(id)
            | Self::TokenExpired(id) => vec![id.to_string()],
            Self::EmailInvalid(email) | Self::DuplicateEmail(email) => vec![email.clone()],
            Self::FieldIsInvariant(field) => vec![field.to_string()],
            Self::IdMismatch { expected, actual } => vec![actual.to_string(), expected.to_string()],
            Self::Database(_) | Self::Internal(_) => Vec::new(),
        }
    }

    /// Resolve the message for `locale` and attach key, status and code.
    pub fn localize(self, locale: Locale) -> LocalizedError {
        match &self {
            Self::Database(details) | Self::Internal(details) => {
                tracing::error!(error = %details, "Contact details request failed");
            }
            _ => {}
        }

        let params = self.params();
        let params: Vec<&str> = params.iter().map(String::as_str).collect();
        let key = self.message_key();

        LocalizedError::new(
            self.status(),
            self.error_code(),
            key.as_ref(),
            resolve(key, locale, &params),
        )
    }
}

impl From<sea_orm::DbErr> for ContactDetailsError {
    fn from(err: sea_orm::DbErr) -> Self {
        ContactDetailsError::Database(err.to_string())
    }
}

/// Default-locale conversion for callers without request context
impl From<ContactDetailsError> for AppError {
    fn from(err: ContactDetailsError) -> Self {
        AppError::Localized(err.localize(Locale::default()))
    }
}

impl IntoResponse for ContactDetailsError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
