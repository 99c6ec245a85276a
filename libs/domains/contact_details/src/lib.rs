//! Contact Details Domain
//!
//! Per-user contact details and the email verification workflow that moves
//! an address from pending to verified.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │           Handlers           │  ← /contactDetails routes, audit events
//! └──────────────┬───────────────┘
//! ┌──────────────▼───────────────┐
//! │      ContactDetailsApi       │  ← locale, upsert then issue/discard token
//! └───────┬──────────────┬───────┘
//!         │              │
//! ┌───────▼──────┐ ┌─────▼─────────────────────┐
//! │ContactDetails│ │ EmailVerificationWorkflow │  ← issue / complete / resend tokens
//! │   Service    │ └─────┬──────────┬──────────┘
//! └───────┬──────┘       │          │
//!         │              │   ┌──────▼───────────────┐
//!         │              │   │ VerificationNotifier │  ← best effort
//!         │              │   └──────────────────────┘
//! ┌───────▼──────────────▼───────┐
//! │ Repositories + PermissionGate│  ← contact details, tokens (trait + impls)
//! └──────────────┬───────────────┘
//!                │
//! ┌──────────────▼───────────────┐
//! │            Models            │  ← ContactDetails, EmailVerificationToken, DTOs
//! └──────────────────────────────┘
//! ```
//!
//! Writers on the same user id are serialized through [`RecordLocks`], and
//! the token store keeps at most one token per contact details record.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domain_contact_details::{
//!     handlers, AllowAll, ContactDetailsApi, InMemoryContactDetailsRepository,
//!     InMemoryVerificationTokenRepository, Locale, VerificationConfig, VerificationNotifier,
//! };
//!
//! # fn example(notifier: Arc<dyn VerificationNotifier>) {
//! let api = ContactDetailsApi::new(
//!     InMemoryContactDetailsRepository::new(),
//!     InMemoryVerificationTokenRepository::new(),
//!     Arc::new(AllowAll),
//!     notifier,
//!     VerificationConfig::default(),
//!     Locale::En,
//! );
//!
//! let router = handlers::router(api);
//! # }
//! ```

pub mod api;
pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod locks;
pub mod messages;
pub mod models;
pub mod notifier;
pub mod permission;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod workflow;

pub use api::ContactDetailsApi;
pub use config::VerificationConfig;
pub use error::{ContactDetailsError, ContactDetailsResult};
pub use locks::RecordLocks;
pub use messages::{Locale, MessageKey, resolve};
pub use models::{
    ContactDetails, ContactDetailsDto, EmailDetailsDto, EmailVerificationToken,
    PendingVerificationDto,
};
pub use notifier::{DispatchError, VerificationDispatch, VerificationNotifier};
pub use permission::{AllowAll, PermissionGate, StaticPermissionGate};
pub use postgres::{PgContactDetailsRepository, PgVerificationTokenRepository};
pub use repository::{
    ContactDetailsRepository, InMemoryContactDetailsRepository,
    InMemoryVerificationTokenRepository, VerificationTokenRepository,
};
pub use service::{ContactDetailsService, UpsertOutcome};
pub use workflow::EmailVerificationWorkflow;
