//! Authorization checks run by handlers before touching a target resource.

use crate::{
    errors::AuthError,
    models::{account::UserRole, auth::RequestIdentity},
};

pub fn require_role(identity: &RequestIdentity, role: UserRole) -> Result<(), AuthError> {
    if identity.role == role {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

/// Admins may act on any account; everyone else only on their own.
pub fn require_self_or_admin(identity: &RequestIdentity, target_account_id: &str) -> Result<(), AuthError> {
    if identity.role == UserRole::Admin || identity.account_id == target_account_id {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn caller(account_id: &str, role: UserRole) -> RequestIdentity {
        RequestIdentity {
            account_id: account_id.into(),
            email: "a@x.com".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            role,
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn role_must_match_exactly() {
        assert!(require_role(&caller("u1", UserRole::Admin), UserRole::Admin).is_ok());
        assert!(matches!(
            require_role(&caller("u1", UserRole::User), UserRole::Admin),
            Err(AuthError::Forbidden)
        ));
        assert!(matches!(
            require_role(&caller("u1", UserRole::default()), UserRole::Admin),
            Err(AuthError::Forbidden)
        ));
        assert!(require_role(&caller("u1", UserRole::User), UserRole::User).is_ok());
    }

    #[test]
    fn user_may_only_reach_own_account() {
        let user = caller("u1", UserRole::User);
        assert!(require_self_or_admin(&user, "u1").is_ok());
        assert!(matches!(require_self_or_admin(&user, "u2"), Err(AuthError::Forbidden)));
    }

    #[test]
    fn admin_may_reach_any_account() {
        let admin = caller("a1", UserRole::Admin);
        assert!(require_self_or_admin(&admin, "a1").is_ok());
        assert!(require_self_or_admin(&admin, "u2").is_ok());
    }
}
