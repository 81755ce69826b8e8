use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::{errors::AuthError, models::auth::Claims};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Signs and verifies claim sets with the process-wide HMAC secret.
pub struct ClaimsCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl ClaimsCodec {
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        if secret.trim().is_empty() {
            return Err(AuthError::Configuration("JWT secret is empty".into()));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding)
            .map_err(|e| AuthError::Configuration(format!("failed to sign token: {e}")))
    }

    /// Decodes the payload without checking the signature.
    ///
    /// Good enough to read `kind` and `exp` for cheap pre-checks; never trust the
    /// result for authentication.
    pub fn peek(token: &str) -> Result<Claims, AuthError> {
        let mut validation = validation();
        validation.insecure_disable_signature_validation();

        let claims = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|_| AuthError::InvalidSignature)?
            .claims;
        if claims.exp <= claims.iat {
            return Err(AuthError::InvalidSignature);
        }
        Ok(claims)
    }

    /// Structure, then expiry against `now`, then signature.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let claims = Self::peek(token)?;
        if claims.is_expired_at(now) {
            return Err(AuthError::Expired);
        }

        let data = decode::<Claims>(token, &self.decoding, &validation())
            .map_err(|_| AuthError::InvalidSignature)?;
        Ok(data.claims)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now())
    }
}

// Expiry is checked against an explicit clock in `verify_at`, not by jsonwebtoken.
fn validation() -> Validation {
    let mut validation = Validation::new(ALGORITHM);
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "iat", "sub"]);
    validation
}
