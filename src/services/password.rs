use crate::errors::ApiError;

pub fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    bcrypt::hash(password, cost).map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Malformed hashes count as a mismatch; callers only ever learn yes or no.
pub fn verify_password(candidate: &str, hash: &str) -> bool {
    bcrypt::verify(candidate, hash).unwrap_or(false)
}
