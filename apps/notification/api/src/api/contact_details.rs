//! Wiring of the contact details domain onto the configured storage.

use axum::Router;
use domain_contact_details::{
    AllowAll, ContactDetailsApi, ContactDetailsRepository, InMemoryContactDetailsRepository,
    InMemoryVerificationTokenRepository, PgContactDetailsRepository, PgVerificationTokenRepository,
    VerificationTokenRepository, handlers,
};
use domain_notifications::{
    InMemoryNotificationRepository, InMemoryPendingNotificationRepository, NotificationRepository,
    PendingNotificationQueue, PendingNotificationRepository, PgNotificationRepository,
    PgPendingNotificationRepository,
};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::cleanup::spawn_token_cleanup;
use crate::config::Config;
use crate::notifier::QueueNotifier;
use crate::state::AppState;

/// Contact details router and its token cleanup task.
pub fn mount(state: &AppState) -> (Router, JoinHandle<()>) {
    match &state.db {
        Some(db) => wire(
            PgContactDetailsRepository::new(db.clone()),
            PgVerificationTokenRepository::new(db.clone()),
            PendingNotificationQueue::new(
                PgNotificationRepository::new(db.clone()),
                PgPendingNotificationRepository::new(db.clone()),
            ),
            &state.config,
        ),
        None => wire(
            InMemoryContactDetailsRepository::new(),
            InMemoryVerificationTokenRepository::new(),
            PendingNotificationQueue::new(
                InMemoryNotificationRepository::new(),
                InMemoryPendingNotificationRepository::new(),
            ),
            &state.config,
        ),
    }
}

fn wire<C, T, N, P>(
    contacts: C,
    tokens: T,
    queue: PendingNotificationQueue<N, P>,
    config: &Config,
) -> (Router, JoinHandle<()>)
where
    C: ContactDetailsRepository + 'static,
    T: VerificationTokenRepository + 'static,
    N: NotificationRepository + 'static,
    P: PendingNotificationRepository + 'static,
{
    let notifier = QueueNotifier::new(queue, config.verification.clone(), config.default_locale);

    // Authentication is handled upstream; every caller may manage every record.
    let api = ContactDetailsApi::new(
        contacts,
        tokens,
        Arc::new(AllowAll),
        Arc::new(notifier),
        config.verification.clone(),
        config.default_locale,
    );

    let cleanup = spawn_token_cleanup(api.workflow().clone(), config.verification.cleanup_interval);

    (handlers::router(api), cleanup)
}
