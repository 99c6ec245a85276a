//! UUID path parameter extractors.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// Single UUID path parameter, e.g. `/contactDetails/{userId}`.
///
/// A malformed id is answered with a 400 `INVALID_UUID` body.
pub struct UuidPath(pub Uuid);

impl<S> FromRequestParts<S> for UuidPath
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        parse(&id).map(UuidPath)
    }
}

/// Two UUID path parameters in route order, e.g. `/{userId}/verifications/{token}`.
pub struct UuidPathPair(pub Uuid, pub Uuid);

impl<S> FromRequestParts<S> for UuidPathPair
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((first, second)) = Path::<(String, String)>::from_request_parts(parts, state)
            .await
            .map_err(|e| e.into_response())?;

        Ok(UuidPathPair(parse(&first)?, parse(&second)?))
    }
}

fn parse(raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw).map_err(|e| AppError::UuidError(e).into_response())
}
