use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use vigil_services::{Identity, auth::Claims};

use crate::{error::ApiError, state::AppState};

/// The resolved identity of the caller, from a Bearer header or the `access_token` cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity: Identity,
    pub claims: Claims,
}

impl AuthUser {
    pub fn session_id(&self) -> &str {
        &self.claims.sid
    }
}

pub fn bearer_or_cookie(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .or_else(|| {
            parts
                .headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        cookie
                            .trim()
                            .strip_prefix("access_token=")
                            .filter(|s| !s.is_empty())
                            .map(|s| s.to_string())
                    })
                })
        })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_or_cookie(parts)
            .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

        let claims = state.auth.verify_identity_token(&token)?;
        state.sessions.ensure_active(&claims.sid)?;
        let identity = Identity::from_claims(&claims)?;

        Ok(AuthUser { identity, claims })
    }
}
