pub use sea_orm_migration::prelude::*;

mod m20251020_000000_create_user_contact_details;
mod m20251020_000001_create_email_verification_tokens;
mod m20251020_000002_create_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251020_000000_create_user_contact_details::Migration),
            Box::new(m20251020_000001_create_email_verification_tokens::Migration),
            Box::new(m20251020_000002_create_notifications::Migration),
        ]
    }
}
