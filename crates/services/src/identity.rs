use bson::oid::ObjectId;
use chrono::{DateTime, TimeZone, Utc};

use crate::auth::{AuthError, Claims, TokenType};
use crate::dao::attendance::AttendeeKey;

/// Who is using the service for the current request.
#[derive(Debug, Clone, PartialEq)]
pub enum Identity {
    Verified(VerifiedSession),
    Unverified(LocalProfile),
}

/// An account that logged in with a password.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedSession {
    pub user_id: ObjectId,
    pub email: String,
    pub full_name: String,
    pub session_id: String,
}

/// Name and email entered by a visitor. Never checked against anything.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalProfile {
    pub email: String,
    pub full_name: String,
    pub joined_at: DateTime<Utc>,
}

impl Identity {
    pub fn from_claims(claims: &Claims) -> Result<Self, AuthError> {
        match claims.token_type {
            TokenType::Access => {
                let user_id = ObjectId::parse_str(&claims.sub)
                    .map_err(|_| AuthError::InvalidToken("Invalid user ID in token".to_string()))?;
                Ok(Identity::Verified(VerifiedSession {
                    user_id,
                    email: claims.email.clone(),
                    full_name: claims.full_name.clone(),
                    session_id: claims.sid.clone(),
                }))
            }
            TokenType::Guest => {
                let joined_at = claims
                    .joined_at
                    .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
                    .ok_or_else(|| AuthError::InvalidToken("Guest token without join time".to_string()))?;
                Ok(Identity::Unverified(LocalProfile {
                    email: claims.email.clone(),
                    full_name: claims.full_name.clone(),
                    joined_at,
                }))
            }
            TokenType::Refresh => Err(AuthError::InvalidToken(
                "Refresh tokens cannot identify a request".to_string(),
            )),
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Identity::Verified(s) => &s.email,
            Identity::Unverified(p) => &p.email,
        }
    }

    pub fn full_name(&self) -> &str {
        match self {
            Identity::Verified(s) => &s.full_name,
            Identity::Unverified(p) => &p.full_name,
        }
    }

    pub fn user_id(&self) -> Option<ObjectId> {
        match self {
            Identity::Verified(s) => Some(s.user_id),
            Identity::Unverified(_) => None,
        }
    }

    pub fn attendee_key(&self) -> AttendeeKey {
        match self {
            Identity::Verified(s) => AttendeeKey::Member(s.user_id),
            Identity::Unverified(p) => AttendeeKey::Guest {
                email: p.email.clone(),
                full_name: p.full_name.clone(),
            },
        }
    }
}
