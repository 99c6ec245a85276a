//! SeaORM entities for `user_contact_details` and `email_verification_tokens`.

pub mod contact_details;
pub mod verification_token;
