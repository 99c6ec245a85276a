/// Errors raised by the readiness probe and connection helpers.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    Postgres(#[from] sea_orm::DbErr),

    /// The backend answered the probe with an error.
    #[error("{backend} is not ready: {reason}")]
    Unhealthy {
        backend: &'static str,
        reason: String,
    },
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
