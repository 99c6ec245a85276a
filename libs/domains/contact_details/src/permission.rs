//! Management capability checks.

use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{ContactDetailsError, ContactDetailsResult};

/// Decides whether the current caller may manage a user's contact details.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionGate: Send + Sync {
    async fn can_manage(&self, user_id: Uuid) -> bool;
}

/// `PermissionDenied` unless `gate` grants `user_id`.
pub(crate) async fn ensure_can_manage(
    gate: &dyn PermissionGate,
    user_id: Uuid,
) -> ContactDetailsResult<()> {
    if gate.can_manage(user_id).await {
        Ok(())
    } else {
        tracing::info!(user_id = %user_id, "Permission to manage contact details denied");
        Err(ContactDetailsError::PermissionDenied(user_id))
    }
}

/// Grants every request. Used when authorization happens upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl PermissionGate for AllowAll {
    async fn can_manage(&self, _user_id: Uuid) -> bool {
        true
    }
}

/// Grants a fixed set of users and nobody else.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissionGate {
    allowed: HashSet<Uuid>,
}

impl StaticPermissionGate {
    pub fn new(allowed: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    pub fn deny_all() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionGate for StaticPermissionGate {
    async fn can_manage(&self, user_id: Uuid) -> bool {
        self.allowed.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_gate() {
        let allowed = Uuid::new_v4();
        let gate = StaticPermissionGate::new([allowed]);

        assert!(ensure_can_manage(&gate, allowed).await.is_ok());
        assert!(matches!(
            ensure_can_manage(&gate, Uuid::new_v4()).await,
            Err(ContactDetailsError::PermissionDenied(_))
        ));
        assert!(!StaticPermissionGate::deny_all().can_manage(allowed).await);
        assert!(AllowAll.can_manage(allowed).await);
    }
}
