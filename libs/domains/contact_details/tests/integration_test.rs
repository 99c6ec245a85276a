//! Integration tests for the contact details domain
//!
//! Run against PostgreSQL via testcontainers:
//! - the email unique index surfaces as a duplicate email error
//! - token issuance replaces the previous token of the same record
//! - verification round trip through the Postgres stores

use chrono::{Duration, Utc};
use domain_contact_details::*;
use std::sync::Arc;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

fn with_email(user_id: uuid::Uuid, email: &str) -> ContactDetails {
    let mut details = ContactDetails::new(user_id);
    details.email = Some(email.to_string());
    details
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_save_upserts_and_reads_back() {
    let db = TestDatabase::new().await;
    let repo = PgContactDetailsRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_contact_upsert");
    let user_id = builder.user_id();

    repo.save(with_email(user_id, &builder.email("first"))).await.unwrap();

    let mut updated = with_email(user_id, &builder.email("second"));
    updated.phone_number = Some("555-0100".to_string());
    updated.allow_notify = false;
    repo.save(updated.clone()).await.unwrap();

    let stored = assert_some(repo.find_by_id(user_id).await.unwrap(), "contact details");
    assert_eq!(stored, updated);
    assert!(repo.exists(user_id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_email_maps_to_domain_error() {
    let db = TestDatabase::new().await;
    let repo = PgContactDetailsRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_contact_duplicate");
    let email = builder.email("shared");

    repo.save(with_email(builder.user_id_n(1), &email)).await.unwrap();
    let result = repo.save(with_email(builder.user_id_n(2), &email)).await;

    assert!(matches!(result, Err(ContactDetailsError::DuplicateEmail(e)) if e == email));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_token_replace_keeps_one_per_record() {
    let db = TestDatabase::new().await;
    let contacts = PgContactDetailsRepository::new(db.connection());
    let tokens = PgVerificationTokenRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_token_replace");
    let user_id = builder.user_id();
    contacts.save(ContactDetails::new(user_id)).await.unwrap();

    let now = Utc::now();
    let first = EmailVerificationToken::issue(user_id, builder.email("a"), Duration::hours(1), now);
    let second = EmailVerificationToken::issue(user_id, builder.email("b"), Duration::hours(1), now);
    tokens.replace_for_contact_details(first.clone()).await.unwrap();
    tokens.replace_for_contact_details(second.clone()).await.unwrap();

    assert!(tokens.find_by_id(first.id).await.unwrap().is_none());
    let pending = assert_some(
        tokens.find_by_contact_details(user_id).await.unwrap(),
        "pending token",
    );
    assert_uuid_eq(pending.id, second.id, "token id");
    assert_eq!(pending.email_address, second.email_address);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_delete_expired_leaves_live_tokens() {
    let db = TestDatabase::new().await;
    let contacts = PgContactDetailsRepository::new(db.connection());
    let tokens = PgVerificationTokenRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("pg_token_expiry");
    let stale_owner = builder.user_id_n(1);
    let live_owner = builder.user_id_n(2);
    contacts.save(ContactDetails::new(stale_owner)).await.unwrap();
    contacts.save(ContactDetails::new(live_owner)).await.unwrap();

    let now = Utc::now();
    let stale = EmailVerificationToken::issue(
        stale_owner,
        builder.email("stale"),
        Duration::hours(1),
        now - Duration::hours(3),
    );
    let live = EmailVerificationToken::issue(live_owner, builder.email("live"), Duration::hours(1), now);
    tokens.replace_for_contact_details(stale.clone()).await.unwrap();
    tokens.replace_for_contact_details(live.clone()).await.unwrap();

    assert_eq!(tokens.delete_expired(now).await.unwrap(), 1);
    assert!(tokens.find_by_id(stale.id).await.unwrap().is_none());
    assert!(tokens.find_by_id(live.id).await.unwrap().is_some());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_verification_round_trip_on_postgres() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("pg_verification_cycle");
    let user_id = builder.user_id();
    let email = builder.email("cycle");

    struct Silent;

    #[async_trait::async_trait]
    impl VerificationNotifier for Silent {
        async fn send_verification(&self, _: VerificationDispatch) -> Result<(), DispatchError> {
            Ok(())
        }
    }

    let api = ContactDetailsApi::new(
        PgContactDetailsRepository::new(db.connection()),
        PgVerificationTokenRepository::new(db.connection()),
        Arc::new(AllowAll),
        Arc::new(Silent),
        VerificationConfig::default(),
        Locale::En,
    );

    let request = ContactDetailsDto {
        reference_data_user_id: Some(user_id),
        phone_number: None,
        allow_notify: true,
        email_details: Some(EmailDetailsDto {
            email: Some(email.clone()),
            email_verified: false,
        }),
    };
    api.save_contact_details(user_id, request).await.unwrap();

    let token = assert_some(
        api.workflow().get_pending_verification(user_id).await.unwrap(),
        "pending token",
    );
    let verified = api
        .workflow()
        .complete_verification(user_id, token.id)
        .await
        .unwrap();

    assert!(verified.email_verified);
    assert_eq!(verified.email.as_deref(), Some(email.as_str()));
    assert!(api.workflow().get_pending_verification(user_id).await.unwrap().is_none());
}
