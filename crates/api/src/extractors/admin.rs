use axum::{extract::FromRequestParts, http::request::Parts};
use bson::oid::ObjectId;
use tracing::info;
use vigil_services::{AdminAccess, check_admin};

use super::auth::AuthUser;
use crate::{error::ApiError, state::AppState};

/// An authenticated caller that holds the admin role.
///
/// A failed role lookup is rejected exactly like a missing role.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user_id: ObjectId,
    pub auth: AuthUser,
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;

        match check_admin(state.roles.as_ref(), &auth.identity).await {
            AdminAccess::Granted { user_id } => Ok(AdminUser { user_id, auth }),
            AdminAccess::Denied(reason) => {
                info!(email = %auth.identity.email(), ?reason, "Admin access denied");
                Err(ApiError::Forbidden("You don't have admin access".to_string()))
            }
        }
    }
}
