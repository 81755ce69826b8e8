use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{db::AccountStore, errors::AuthError, models::auth::TokenPair};

/// Writes the latest token pair onto the owning account.
///
/// Last writer wins: concurrent logins for one account overwrite each other and
/// only the most recent refresh token stays usable.
#[derive(Clone)]
pub struct TokenStore {
    accounts: Arc<dyn AccountStore>,
}

impl TokenStore {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    pub async fn persist(&self, account_id: Uuid, pair: &TokenPair) -> Result<(), AuthError> {
        self.persist_at(account_id, pair, Utc::now()).await
    }

    pub async fn persist_at(&self, account_id: Uuid, pair: &TokenPair, now: DateTime<Utc>) -> Result<(), AuthError> {
        self.accounts
            .update_tokens(account_id, &pair.access_token, &pair.refresh_token, now)
            .await
            .map_err(|e| {
                tracing::warn!("failed to persist tokens for account {account_id}: {e}");
                AuthError::Persistence(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryAccountStore,
        errors::StoreError,
        models::account::{NewAccount, UserRole},
    };

    fn pair(tag: &str) -> TokenPair {
        TokenPair {
            access_token: format!("access-{tag}"),
            refresh_token: format!("refresh-{tag}"),
            access_expires_at: Utc::now(),
            refresh_expires_at: Utc::now(),
        }
    }

    async fn seeded() -> (Arc<MemoryAccountStore>, Uuid) {
        let store = Arc::new(MemoryAccountStore::new());
        let id = Uuid::new_v4();
        store
            .insert(&NewAccount {
                id,
                email: "a@x.com".into(),
                password_hash: "hash".into(),
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                phone: Some("555".into()),
                role: UserRole::User,
                created_at: Utc::now() - chrono::Duration::days(1),
            })
            .await
            .unwrap();
        (store, id)
    }

    #[tokio::test]
    async fn persist_overwrites_pair_and_timestamp_only() {
        let (accounts, id) = seeded().await;
        let before = accounts.find_by_id(id).await.unwrap().unwrap();
        let tokens = TokenStore::new(accounts.clone());

        let now = Utc::now();
        tokens.persist_at(id, &pair("1"), now).await.unwrap();
        tokens.persist_at(id, &pair("2"), now).await.unwrap();

        let after = accounts.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(after.access_token.as_deref(), Some("access-2"));
        assert_eq!(after.refresh_token.as_deref(), Some("refresh-2"));
        assert_eq!(after.updated_at, now);
        assert_eq!(after.email, before.email);
        assert_eq!(after.phone, before.phone);
        assert_eq!(after.password_hash, before.password_hash);
        assert_eq!(after.created_at, before.created_at);
    }

    #[tokio::test]
    async fn unknown_account_is_persistence_error() {
        let (accounts, _) = seeded().await;
        let tokens = TokenStore::new(accounts.clone());

        let result = tokens.persist(Uuid::new_v4(), &pair("x")).await;
        assert!(matches!(result, Err(AuthError::Persistence(StoreError::NotFound))));
        assert_eq!(
            accounts.list(crate::models::account::ListPage::new(None, None)).await.unwrap().0,
            1
        );
    }
}
