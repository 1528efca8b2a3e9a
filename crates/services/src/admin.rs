use async_trait::async_trait;
use bson::oid::ObjectId;
use tracing::warn;
use vigil_db::models::{RoleName, UserRole};

use crate::dao::base::DaoResult;
use crate::identity::Identity;

/// Single-row role lookup backing the admin gate.
#[async_trait]
pub trait RoleLookup: Send + Sync {
    async fn find_role(&self, user_id: ObjectId, role: RoleName) -> DaoResult<Option<UserRole>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAccess {
    Granted { user_id: ObjectId },
    Denied(DenialReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Entry-form identities never hold roles.
    Unverified,
    NoRole,
    /// The lookup itself failed. Callers treat this like `NoRole`.
    LookupFailed,
}

impl AdminAccess {
    pub fn is_granted(&self) -> bool {
        matches!(self, AdminAccess::Granted { .. })
    }
}

pub async fn check_admin<L>(lookup: &L, identity: &Identity) -> AdminAccess
where
    L: RoleLookup + ?Sized,
{
    let user_id = match identity {
        Identity::Verified(session) => session.user_id,
        Identity::Unverified(_) => return AdminAccess::Denied(DenialReason::Unverified),
    };

    match lookup.find_role(user_id, RoleName::Admin).await {
        Ok(Some(_)) => AdminAccess::Granted { user_id },
        Ok(None) => AdminAccess::Denied(DenialReason::NoRole),
        Err(e) => {
            warn!(%user_id, error = %e, "Admin role lookup failed");
            AdminAccess::Denied(DenialReason::LookupFailed)
        }
    }
}
