use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
};
use axum_helpers::{
    AcceptLanguage, AuditEvent, AuditOutcome, LocalizedError, UuidPath, UuidPathPair,
    ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::api::ContactDetailsApi;
use crate::error::{ContactDetailsError, ContactDetailsResult};
use crate::messages::{MessageKey, resolve};
use crate::models::{ContactDetailsDto, EmailDetailsDto, PendingVerificationDto};
use crate::repository::{ContactDetailsRepository, VerificationTokenRepository};

pub const TAG: &str = "contact-details";

/// OpenAPI documentation for the contact details API
#[derive(OpenApi)]
#[openapi(
    paths(
        get_contact_details,
        put_contact_details,
        get_pending_verification,
        resend_verification,
        verify_email,
    ),
    components(
        schemas(ContactDetailsDto, EmailDetailsDto, PendingVerificationDto),
        responses(
            BadRequestResponse,
            BadRequestUuidResponse,
            ForbiddenResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Contact details and email verification")
    )
)]
pub struct ApiDoc;

type SharedApi<C, T> = State<Arc<ContactDetailsApi<C, T>>>;

/// Routes relative to the `/contactDetails` mount point.
pub fn router<C, T>(api: ContactDetailsApi<C, T>) -> Router
where
    C: ContactDetailsRepository + 'static,
    T: VerificationTokenRepository + 'static,
{
    Router::new()
        .route(
            "/{userId}",
            get(get_contact_details::<C, T>).put(put_contact_details::<C, T>),
        )
        .route(
            "/{userId}/verifications",
            get(get_pending_verification::<C, T>).post(resend_verification::<C, T>),
        )
        .route("/{userId}/verifications/{token}", get(verify_email::<C, T>))
        .with_state(Arc::new(api))
}

fn audit<V>(
    action: &str,
    user_id: Uuid,
    headers: &HeaderMap,
    result: &ContactDetailsResult<V>,
) -> AuditEvent {
    let event = match result {
        Ok(_) => AuditEvent::new(action, AuditOutcome::Success),
        Err(ContactDetailsError::PermissionDenied(_)) => {
            AuditEvent::new(action, AuditOutcome::Denied)
        }
        Err(e) => AuditEvent::new(action, AuditOutcome::Failure)
            .with_details(json!({ "messageKey": e.message_key().to_string() })),
    };

    event.with_subject(user_id).with_request_headers(headers)
}

/// Get the contact details of a user
#[utoipa::path(
    get,
    path = "/{userId}",
    tag = TAG,
    params(
        ("userId" = Uuid, Path, description = "Reference data user id")
    ),
    responses(
        (status = 200, description = "Contact details found", body = ContactDetailsDto),
        (status = 400, response = BadRequestUuidResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_contact_details<C, T>(
    State(api): SharedApi<C, T>,
    accept: AcceptLanguage,
    UuidPath(user_id): UuidPath,
) -> Result<Json<ContactDetailsDto>, LocalizedError>
where
    C: ContactDetailsRepository,
    T: VerificationTokenRepository,
{
    let locale = api.locale(&accept);
    let details = api
        .get_contact_details(user_id)
        .await
        .map_err(|e| e.localize(locale))?;

    Ok(Json(ContactDetailsDto::from(&details)))
}

/// Create or update the contact details of a user
///
/// A new email address is stored unverified and a verification message is sent.
#[utoipa::path(
    put,
    path = "/{userId}",
    tag = TAG,
    params(
        ("userId" = Uuid, Path, description = "Reference data user id")
    ),
    request_body = ContactDetailsDto,
    responses(
        (status = 200, description = "Contact details stored", body = ContactDetailsDto),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn put_contact_details<C, T>(
    State(api): SharedApi<C, T>,
    accept: AcceptLanguage,
    headers: HeaderMap,
    UuidPath(user_id): UuidPath,
    ValidatedJson(requested): ValidatedJson<ContactDetailsDto>,
) -> Result<Json<ContactDetailsDto>, LocalizedError>
where
    C: ContactDetailsRepository,
    T: VerificationTokenRepository,
{
    let locale = api.locale(&accept);
    let result = api.save_contact_details(user_id, requested).await;

    let event = audit("contact_details.update", user_id, &headers, &result);
    match &result {
        Ok(outcome) => event
            .with_resource(format!("contact_details:{user_id}"))
            .with_details(json!({
                "created": outcome.created,
                "emailChanged": outcome.email_changed(),
            }))
            .log(),
        Err(_) => event.log(),
    }

    let outcome = result.map_err(|e| e.localize(locale))?;
    Ok(Json(ContactDetailsDto::from(&outcome.details)))
}

/// Get the outstanding email verification of a user
///
/// Answers `null` when the user exists but nothing is pending.
#[utoipa::path(
    get,
    path = "/{userId}/verifications",
    tag = TAG,
    params(
        ("userId" = Uuid, Path, description = "Reference data user id")
    ),
    responses(
        (status = 200, description = "Pending verification, if any", body = Option<PendingVerificationDto>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_pending_verification<C, T>(
    State(api): SharedApi<C, T>,
    accept: AcceptLanguage,
    UuidPath(user_id): UuidPath,
) -> Result<Json<Option<PendingVerificationDto>>, LocalizedError>
where
    C: ContactDetailsRepository,
    T: VerificationTokenRepository,
{
    let locale = api.locale(&accept);
    let pending = api
        .workflow()
        .get_pending_verification(user_id)
        .await
        .map_err(|e| e.localize(locale))?;

    Ok(Json(pending.as_ref().map(PendingVerificationDto::from)))
}

/// Re-send the verification message for the pending address
#[utoipa::path(
    post,
    path = "/{userId}/verifications",
    tag = TAG,
    params(
        ("userId" = Uuid, Path, description = "Reference data user id")
    ),
    responses(
        (status = 200, description = "Verification re-issued", body = PendingVerificationDto),
        (status = 400, response = BadRequestResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn resend_verification<C, T>(
    State(api): SharedApi<C, T>,
    accept: AcceptLanguage,
    headers: HeaderMap,
    UuidPath(user_id): UuidPath,
) -> Result<Json<PendingVerificationDto>, LocalizedError>
where
    C: ContactDetailsRepository,
    T: VerificationTokenRepository,
{
    let locale = api.locale(&accept);
    let result = api.workflow().resend_verification(user_id).await;

    audit("contact_details.verification.resend", user_id, &headers, &result).log();

    let token = result.map_err(|e| e.localize(locale))?;
    Ok(Json(PendingVerificationDto::from(&token)))
}

/// Complete an email verification
///
/// The token itself authorizes the call; answers a localized plain-text message.
#[utoipa::path(
    get,
    path = "/{userId}/verifications/{token}",
    tag = TAG,
    params(
        ("userId" = Uuid, Path, description = "Reference data user id"),
        ("token" = Uuid, Path, description = "Verification token")
    ),
    responses(
        (status = 200, description = "Email address verified", body = String, content_type = "text/plain"),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn verify_email<C, T>(
    State(api): SharedApi<C, T>,
    accept: AcceptLanguage,
    headers: HeaderMap,
    UuidPathPair(user_id, token_id): UuidPathPair,
) -> Result<(StatusCode, String), LocalizedError>
where
    C: ContactDetailsRepository,
    T: VerificationTokenRepository,
{
    let locale = api.locale(&accept);
    let result = api.workflow().complete_verification(user_id, token_id).await;

    audit("contact_details.verify", user_id, &headers, &result)
        .with_resource(format!("verification:{token_id}"))
        .log();

    let details = result.map_err(|e| e.localize(locale))?;
    let message = resolve(
        MessageKey::EmailVerificationSuccess,
        locale,
        &[details.email().unwrap_or_default()],
    );

    Ok((StatusCode::OK, message))
}
