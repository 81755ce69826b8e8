use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::{Account, UserRole};
use crate::errors::AuthError;

/// Stable attributes of the token subject, taken from the account at issuance time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

impl From<&Account> for Identity {
    fn from(a: &Account) -> Self {
        Self {
            account_id: a.id.to_string(),
            email: a.email.clone(),
            first_name: a.first_name.clone(),
            last_name: a.last_name.clone(),
            role: a.role(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims embedded in both access and refresh JWTs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // account UUID
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
    pub jti: String, // unique per issued token
}

impl Claims {
    pub fn new(
        identity: &Identity,
        kind: TokenKind,
        issued_at: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> Result<Self, AuthError> {
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Configuration(format!("token expiry out of range: {issued_at} + {ttl}")))?;
        Ok(Self {
            sub: identity.account_id.clone(),
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            role: identity.role,
            kind,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        })
    }

    pub fn identity(&self) -> Identity {
        Identity {
            account_id: self.sub.clone(),
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            role: self.role,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(self.exp, 0).unwrap_or_default()
    }

    /// `exp` is exclusive: a token is no longer valid at its expiry second.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// Access and refresh tokens minted together from one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_expires_at: DateTime<Utc>,
}

/// Extracted from a validated access token — available to handlers via Axum extractors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity {
    pub account_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub expires_at: DateTime<Utc>,
}

impl From<Claims> for RequestIdentity {
    fn from(c: Claims) -> Self {
        let expires_at = c.expires_at();
        Self {
            account_id: c.sub,
            email: c.email,
            first_name: c.first_name,
            last_name: c.last_name,
            role: c.role,
            expires_at,
        }
    }
}
