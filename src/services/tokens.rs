use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    errors::AuthError,
    models::auth::{Claims, Identity, TokenKind, TokenPair},
    services::codec::ClaimsCodec,
};

/// Upper bound on either token lifetime: ten years.
pub const MAX_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Mints access/refresh pairs from an identity.
#[derive(Clone)]
pub struct TokenIssuer {
    codec: Arc<ClaimsCodec>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(codec: Arc<ClaimsCodec>, access_ttl_seconds: u64, refresh_ttl_seconds: u64) -> Result<Self, AuthError> {
        if access_ttl_seconds == 0 || refresh_ttl_seconds <= access_ttl_seconds {
            return Err(AuthError::Configuration(format!(
                "refresh ttl ({refresh_ttl_seconds}s) must exceed access ttl ({access_ttl_seconds}s)"
            )));
        }
        if refresh_ttl_seconds > MAX_TTL_SECONDS {
            return Err(AuthError::Configuration(format!(
                "token ttl ({refresh_ttl_seconds}s) exceeds the maximum of {MAX_TTL_SECONDS}s"
            )));
        }
        let seconds = |s: u64| {
            i64::try_from(s)
                .ok()
                .and_then(Duration::try_seconds)
                .ok_or_else(|| AuthError::Configuration(format!("token ttl out of range: {s}s")))
        };
        Ok(Self {
            codec,
            access_ttl: seconds(access_ttl_seconds)?,
            refresh_ttl: seconds(refresh_ttl_seconds)?,
        })
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn issue(&self, identity: &Identity) -> Result<TokenPair, AuthError> {
        self.issue_at(identity, Utc::now())
    }

    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<TokenPair, AuthError> {
        let access = Claims::new(identity, TokenKind::Access, now, self.access_ttl)?;
        let refresh = Claims::new(identity, TokenKind::Refresh, now, self.refresh_ttl)?;

        Ok(TokenPair {
            access_token: self.codec.sign(&access)?,
            refresh_token: self.codec.sign(&refresh)?,
            access_expires_at: access.expires_at(),
            refresh_expires_at: refresh.expires_at(),
        })
    }
}
