use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;
use vigil_config::AuthMode;
use vigil_db::models::{Member, RoleName};
use vigil_services::{
    Identity, LocalProfile, check_admin,
    dao::{base::DaoError, member::normalize_email},
};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 120))]
    pub full_name: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct JoinRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 120))]
    pub full_name: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub member: MemberResponse,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub profile: ProfileResponse,
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub email: String,
    pub full_name: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionResponse {
    Verified {
        user_id: String,
        email: String,
        full_name: String,
        is_admin: bool,
    },
    Unverified {
        email: String,
        full_name: String,
        joined_at: DateTime<Utc>,
    },
}

impl MemberResponse {
    fn from_member(member: &Member) -> Result<Self, ApiError> {
        let id = member
            .id
            .ok_or_else(|| ApiError::Internal("Member without id".to_string()))?;
        Ok(Self {
            id: id.to_hex(),
            email: member.email.clone(),
            full_name: member.full_name.clone(),
        })
    }
}

impl From<&LocalProfile> for ProfileResponse {
    fn from(profile: &LocalProfile) -> Self {
        Self {
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            joined_at: profile.joined_at,
        }
    }
}

fn require_mode(state: &AppState, mode: AuthMode) -> Result<(), ApiError> {
    if state.settings.auth.mode != mode {
        return Err(ApiError::BadRequest(match mode {
            AuthMode::Verified => "Accounts are disabled; use the entry form".to_string(),
            AuthMode::Unverified => "Entry form is disabled; sign in instead".to_string(),
        }));
    }
    Ok(())
}

fn session_cookie(token: &str, max_age: u64) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    let cookie = format!("access_token={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}");
    let value = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::Internal(format!("Invalid cookie value: {e}")))?;
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

fn issue(
    state: &AppState,
    member: &Member,
    session_id: Option<&str>,
) -> Result<(HeaderMap, AuthResponse), ApiError> {
    let member_response = MemberResponse::from_member(member)?;
    let user_id = member
        .id
        .ok_or_else(|| ApiError::Internal("Member without id".to_string()))?;

    let tokens = match session_id {
        Some(sid) => state
            .auth
            .tokens_for_session(user_id, &member.email, &member.full_name, sid)?,
        None => {
            let tokens = state
                .auth
                .generate_tokens(user_id, &member.email, &member.full_name)?;
            state.sessions.signed_in(&tokens.session_id, &member.email);
            tokens
        }
    };

    let headers = session_cookie(&tokens.access_token, tokens.expires_in)?;
    Ok((
        headers,
        AuthResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            member: member_response,
        },
    ))
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    require_mode(&state, AuthMode::Verified)?;
    body.validate()?;

    let password_hash = state.auth.hash_password(&body.password)?;
    let member = state
        .members
        .create(body.email.clone(), body.full_name.trim().to_string(), password_hash)
        .await
        .map_err(|e| match e {
            DaoError::DuplicateKey(_) => {
                ApiError::Conflict("An account with this email already exists".to_string())
            }
            other => other.into(),
        })?;

    let is_bootstrap_admin = state
        .settings
        .auth
        .admin_emails
        .iter()
        .any(|e| normalize_email(e) == member.email);
    if let (true, Some(user_id)) = (is_bootstrap_admin, member.id) {
        state.roles.grant(user_id, RoleName::Admin).await?;
        info!(email = %member.email, "Granted admin role from configuration");
    }

    let (headers, response) = issue(&state, &member, None)?;
    Ok((StatusCode::CREATED, headers, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    require_mode(&state, AuthMode::Verified)?;

    let member = state
        .members
        .find_by_email(&body.email)
        .await
        .map_err(|e| match e {
            DaoError::NotFound => ApiError::Unauthorized("Invalid credentials".to_string()),
            other => other.into(),
        })?;

    let password_hash = member
        .password_hash
        .as_ref()
        .ok_or_else(|| ApiError::Unauthorized("No password set".to_string()))?;

    if !state.auth.verify_password(&body.password, password_hash)? {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let (headers, response) = issue(&state, &member, None)?;
    Ok((headers, Json(response)))
}

/// Unverified entry: the profile lives only in the returned token.
pub async fn join(
    State(state): State<AppState>,
    Json(body): Json<JoinRequest>,
) -> Result<(StatusCode, HeaderMap, Json<JoinResponse>), ApiError> {
    require_mode(&state, AuthMode::Unverified)?;
    body.validate()?;

    let profile = LocalProfile {
        email: normalize_email(&body.email),
        full_name: body.full_name.trim().to_string(),
        joined_at: Utc::now(),
    };
    let guest = state.auth.generate_guest_token(&profile)?;
    state.sessions.signed_in(&guest.session_id, &profile.email);

    let headers = session_cookie(&guest.token, guest.expires_in)?;
    Ok((
        StatusCode::CREATED,
        headers,
        Json(JoinResponse {
            access_token: guest.token,
            expires_in: guest.expires_in,
            profile: ProfileResponse::from(&profile),
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<(StatusCode, HeaderMap), ApiError> {
    state
        .sessions
        .sign_out(auth.session_id(), state.auth.session_horizon());

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static("access_token=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0"),
    );
    Ok((StatusCode::NO_CONTENT, headers))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let claims = state.auth.verify_refresh_token(&body.refresh_token)?;
    state.sessions.ensure_active(&claims.sid)?;

    let user_id = bson::oid::ObjectId::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("Invalid user ID".to_string()))?;
    let member = state.members.base.find_by_id(user_id).await?;

    let (headers, response) = issue(&state, &member, Some(&claims.sid))?;
    Ok((headers, Json(response)))
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body = match &auth.identity {
        Identity::Verified(session) => {
            let member = state.members.base.find_by_id(session.user_id).await?;
            serde_json::to_value(MemberResponse::from_member(&member)?)
        }
        Identity::Unverified(profile) => serde_json::to_value(ProfileResponse::from(profile)),
    }
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(body))
}

/// Resolves the caller's identity; 401 sends the client to the entry page.
pub async fn session(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<SessionResponse>, ApiError> {
    let response = match &auth.identity {
        Identity::Verified(session) => SessionResponse::Verified {
            user_id: session.user_id.to_hex(),
            email: session.email.clone(),
            full_name: session.full_name.clone(),
            is_admin: check_admin(state.roles.as_ref(), &auth.identity)
                .await
                .is_granted(),
        },
        Identity::Unverified(profile) => SessionResponse::Unverified {
            email: profile.email.clone(),
            full_name: profile.full_name.clone(),
            joined_at: profile.joined_at,
        },
    };

    Ok(Json(response))
}
