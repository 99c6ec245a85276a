//! # Axum Helpers
//!
//! Shared HTTP plumbing for the notification service.
//!
//! - **[`server`]**: router assembly with API docs, health endpoints, graceful shutdown
//! - **[`http`]**: security headers middleware
//! - **[`errors`]**: error body, error codes, localized domain errors
//! - **[`extractors`]**: UUID path, validated JSON, `Accept-Language`
//! - **[`audit`]**: audit events on the `audit` tracing target

pub mod audit;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, cors_layer_from_env,
    create_production_app, create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::security_headers;

pub use errors::{AppError, ErrorCode, ErrorResponse, LocalizedError};

pub use extractors::{AcceptLanguage, UuidPath, UuidPathPair, ValidatedJson};

pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
