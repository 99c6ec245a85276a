use domain_contact_details::{
    ContactDetailsRepository, EmailVerificationWorkflow, VerificationTokenRepository,
};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Purge expired verification tokens every `period` until aborted.
pub fn spawn_token_cleanup<C, T>(
    workflow: EmailVerificationWorkflow<C, T>,
    period: Duration,
) -> JoinHandle<()>
where
    C: ContactDetailsRepository + 'static,
    T: VerificationTokenRepository + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if let Err(e) = workflow.purge_expired().await {
                tracing::warn!(error = %e, "Expired token cleanup failed");
            }
        }
    })
}
