use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use bson::oid::ObjectId;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vigil_config::JwtSettings;

use crate::identity::LocalProfile;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Session has been signed out")]
    SessionRevoked,
    #[error("Password hash error: {0}")]
    HashError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // member id, or email for guests
    pub email: String,
    pub full_name: String,
    /// Shared by the access and refresh token of one sign-in.
    pub sid: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub token_type: TokenType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
    Guest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    #[serde(skip)]
    pub session_id: String,
}

#[derive(Debug, Clone)]
pub struct GuestToken {
    pub token: String,
    pub expires_in: u64,
    pub session_id: String,
}

pub struct AuthService {
    jwt_settings: JwtSettings,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(jwt_settings: JwtSettings) -> Self {
        let encoding_key = EncodingKey::from_secret(jwt_settings.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(jwt_settings.secret.as_bytes());
        Self {
            jwt_settings,
            encoding_key,
            decoding_key,
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?;
        Ok(hash.to_string())
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Issues a fresh session: a new `sid` shared by both tokens.
    pub fn generate_tokens(
        &self,
        user_id: ObjectId,
        email: &str,
        full_name: &str,
    ) -> Result<TokenPair, AuthError> {
        let session_id = uuid::Uuid::new_v4().simple().to_string();
        self.tokens_for_session(user_id, email, full_name, &session_id)
    }

    /// Re-issues tokens for an existing session, keeping its `sid` so sign-out still covers them.
    pub fn tokens_for_session(
        &self,
        user_id: ObjectId,
        email: &str,
        full_name: &str,
        session_id: &str,
    ) -> Result<TokenPair, AuthError> {
        let access_token = self.sign(
            user_id.to_hex(),
            email,
            full_name,
            session_id,
            TokenType::Access,
            self.jwt_settings.access_token_ttl_secs,
            None,
        )?;
        let refresh_token = self.sign(
            user_id.to_hex(),
            email,
            full_name,
            session_id,
            TokenType::Refresh,
            self.jwt_settings.refresh_token_ttl_secs,
            None,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.jwt_settings.access_token_ttl_secs,
            session_id: session_id.to_string(),
        })
    }

    /// Token carrying an unverified profile. Lives as long as a refresh token.
    pub fn generate_guest_token(&self, profile: &LocalProfile) -> Result<GuestToken, AuthError> {
        let session_id = uuid::Uuid::new_v4().simple().to_string();
        let ttl = self.jwt_settings.refresh_token_ttl_secs;
        let token = self.sign(
            profile.email.clone(),
            &profile.email,
            &profile.full_name,
            &session_id,
            TokenType::Guest,
            ttl,
            Some(profile.joined_at.timestamp()),
        )?;

        Ok(GuestToken {
            token,
            expires_in: ttl,
            session_id,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn sign(
        &self,
        sub: String,
        email: &str,
        full_name: &str,
        session_id: &str,
        token_type: TokenType,
        ttl_secs: u64,
        joined_at: Option<i64>,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub,
            email: email.to_string(),
            full_name: full_name.to_string(),
            sid: session_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs as i64)).timestamp(),
            iss: self.jwt_settings.issuer.clone(),
            token_type,
            joined_at,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.jwt_settings.issuer]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Accepts the tokens that identify a request: access tokens and guest tokens.
    pub fn verify_identity_token(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.verify_token(token)?;
        match claims.token_type {
            TokenType::Access | TokenType::Guest => Ok(claims),
            TokenType::Refresh => Err(AuthError::InvalidToken("Not an access token".to_string())),
        }
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.verify_token(token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(AuthError::InvalidToken("Not a refresh token".to_string()));
        }
        Ok(claims)
    }

    /// Unix time after which nothing issued for a session right now is still valid.
    pub fn session_horizon(&self) -> i64 {
        let ttl = self
            .jwt_settings
            .access_token_ttl_secs
            .max(self.jwt_settings.refresh_token_ttl_secs);
        (Utc::now() + Duration::seconds(ttl as i64)).timestamp()
    }
}
