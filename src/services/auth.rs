use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    db::AccountStore,
    errors::{ApiError, AuthError},
    models::{
        account::{Account, AuthResponse, LoginRequest, NewAccount, SignupRequest, UserRole},
        auth::{Identity, TokenKind},
    },
    services::{
        codec::ClaimsCodec,
        metrics,
        password::{hash_password, verify_password},
        token_store::TokenStore,
        tokens::TokenIssuer,
    },
};

/// Signup, login and refresh: everything that mints a token pair.
#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    codec: Arc<ClaimsCodec>,
    issuer: TokenIssuer,
    tokens: TokenStore,
    bcrypt_cost: u32,
    // compared against when the email is unknown, so both login failures cost one bcrypt run
    dummy_hash: Arc<str>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_signup(body: &SignupRequest) -> Result<(), ApiError> {
    for (field, value) in [("first_name", &body.first_name), ("last_name", &body.last_name)] {
        let len = value.trim().chars().count();
        if !(2..=100).contains(&len) {
            return Err(ApiError::Validation(format!("{field} must be between 2 and 100 characters")));
        }
    }
    let email = body.email.trim();
    if email.len() < 3 || !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(ApiError::Validation("email is invalid".into()));
    }
    if body.password.chars().count() < 6 {
        return Err(ApiError::Validation("password must be at least 6 characters".into()));
    }
    Ok(())
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        codec: Arc<ClaimsCodec>,
        issuer: TokenIssuer,
        bcrypt_cost: u32,
    ) -> Result<Self, AuthError> {
        let dummy_hash = bcrypt::hash(Uuid::new_v4().to_string(), bcrypt_cost)
            .map_err(|e| AuthError::Configuration(format!("invalid bcrypt cost {bcrypt_cost}: {e}")))?;
        let tokens = TokenStore::new(accounts.clone());
        Ok(Self {
            accounts,
            codec,
            issuer,
            tokens,
            bcrypt_cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Create a USER account and hand back its first token pair.
    pub async fn signup(&self, body: SignupRequest) -> Result<AuthResponse, ApiError> {
        validate_signup(&body)?;

        let email = normalize_email(&body.email);
        let phone = body
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string);

        if self.accounts.email_or_phone_taken(&email, phone.as_deref()).await? {
            return Err(ApiError::Conflict("this email or phone number already exists".into()));
        }

        let account = self
            .accounts
            .insert(&NewAccount {
                id: Uuid::new_v4(),
                email,
                password_hash: hash_password(&body.password, self.bcrypt_cost)?,
                first_name: body.first_name.trim().to_string(),
                last_name: body.last_name.trim().to_string(),
                phone,
                role: UserRole::User,
                created_at: Utc::now(),
            })
            .await?;

        let response = self.issue_for(account, Utc::now()).await?;
        metrics::record_issued("signup");
        tracing::info!("signup: created account {}", response.user.account_id);
        Ok(response)
    }

    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, body: LoginRequest) -> Result<AuthResponse, ApiError> {
        let email = normalize_email(&body.email);

        let found = self.accounts.find_by_email(&email).await?;
        let account = match self.check_credentials(found, &body.password) {
            Some(account) => account,
            None => {
                metrics::record_login("invalid_credentials");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let response = match self.issue_for(account, Utc::now()).await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_login("error");
                return Err(e);
            }
        };
        metrics::record_login("success");
        metrics::record_issued("login");
        tracing::info!("login: account {}", response.user.account_id);
        Ok(response)
    }

    /// Exactly one bcrypt comparison runs whether or not the account exists.
    fn check_credentials(&self, account: Option<Account>, password: &str) -> Option<Account> {
        let hash = account
            .as_ref()
            .map_or(&*self.dummy_hash, |a| a.password_hash.as_str());
        let matched = verify_password(password, hash);
        account.filter(|_| matched)
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, ApiError> {
        self.refresh_at(refresh_token, Utc::now()).await
    }

    /// Rotate the pair. The presented refresh token must be the one currently stored.
    pub async fn refresh_at(&self, refresh_token: &str, now: DateTime<Utc>) -> Result<AuthResponse, ApiError> {
        let claims = self.codec.verify_at(refresh_token.trim(), now)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AuthError::WrongTokenKind.into());
        }

        let account_id: Uuid = claims.sub.parse().map_err(|_| AuthError::InvalidSignature)?;
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::Superseded)?;

        if account.refresh_token.as_deref() != Some(refresh_token.trim()) {
            tracing::debug!("refresh: stale refresh token for account {account_id}");
            return Err(AuthError::Superseded.into());
        }

        let response = self.issue_for(account, now).await?;
        metrics::record_issued("refresh");
        tracing::info!("refresh: rotated tokens for account {account_id}");
        Ok(response)
    }

    /// Persistence failure aborts the request; no tokens are handed out.
    async fn issue_for(&self, account: Account, now: DateTime<Utc>) -> Result<AuthResponse, ApiError> {
        let pair = self.issuer.issue_at(&Identity::from(&account), now)?;
        self.tokens.persist_at(account.id, &pair, now).await?;

        Ok(AuthResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            access_expires_at: pair.access_expires_at,
            refresh_expires_at: pair.refresh_expires_at,
            user: Account { updated_at: now, ..account }.into(),
        })
    }
}
