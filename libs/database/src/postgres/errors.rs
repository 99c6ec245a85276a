use sea_orm::{DbErr, SqlErr};

/// True when `err` is a unique-constraint violation naming `constraint`.
///
/// Postgres reports the constraint name in the message, e.g.
/// `duplicate key value violates unique constraint "unq_contact_details_email"`.
pub fn unique_violation_on(err: &DbErr, constraint: &str) -> bool {
    matches!(
        err.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(message)) if message.contains(constraint)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_sql_errors_are_not_violations() {
        let err = DbErr::Custom("duplicate key unq_contact_details_email".into());
        assert!(!unique_violation_on(&err, "unq_contact_details_email"));
        assert!(!unique_violation_on(&DbErr::RecordNotUpdated, "anything"));
    }
}
