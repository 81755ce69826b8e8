use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    errors::AuthError,
    models::auth::{RequestIdentity, TokenKind},
    services::codec::ClaimsCodec,
};

/// Authenticates requests from a presented access token.
#[derive(Clone)]
pub struct TokenValidator {
    codec: Arc<ClaimsCodec>,
}

impl TokenValidator {
    pub fn new(codec: Arc<ClaimsCodec>) -> Self {
        Self { codec }
    }

    pub fn validate(&self, presented: Option<&str>) -> Result<RequestIdentity, AuthError> {
        self.validate_at(presented, Utc::now())
    }

    /// Only access tokens authenticate requests; refresh tokens are rejected here.
    pub fn validate_at(&self, presented: Option<&str>, now: DateTime<Utc>) -> Result<RequestIdentity, AuthError> {
        let token = presented
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = self.codec.verify_at(token, now)?;
        if claims.kind != TokenKind::Access {
            return Err(AuthError::WrongTokenKind);
        }
        Ok(claims.into())
    }
}
