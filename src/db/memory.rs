use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::accounts::AccountStore;
use crate::{
    errors::StoreError,
    models::account::{Account, ListPage, NewAccount},
};

/// In-process account store for tests and local runs without Postgres.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn insert(&self, account: &NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().await;
        let clash = accounts.values().any(|a| {
            a.email == account.email || (account.phone.is_some() && a.phone == account.phone)
        });
        if clash || accounts.contains_key(&account.id) {
            return Err(StoreError::Duplicate("this email or phone number already exists".into()));
        }

        let row = Account {
            id: account.id,
            email: account.email.clone(),
            password_hash: account.password_hash.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            phone: account.phone.clone(),
            role: account.role.to_string(),
            access_token: None,
            refresh_token: None,
            created_at: account.created_at,
            updated_at: account.created_at,
        };
        accounts.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn email_or_phone_taken(&self, email: &str, phone: Option<&str>) -> Result<bool, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .any(|a| a.email == email || (phone.is_some() && a.phone.as_deref() == phone)))
    }

    async fn update_tokens(
        &self,
        id: Uuid,
        access_token: &str,
        refresh_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or(StoreError::NotFound)?;
        account.access_token = Some(access_token.to_string());
        account.refresh_token = Some(refresh_token.to_string());
        account.updated_at = updated_at;
        Ok(())
    }

    async fn list(&self, page: ListPage) -> Result<(u64, Vec<Account>), StoreError> {
        let accounts = self.accounts.read().await;
        let mut all: Vec<&Account> = accounts.values().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let items = all
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.per_page as usize)
            .cloned()
            .collect();
        Ok((accounts.len() as u64, items))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::UserRole;

    fn new_account(email: &str, phone: Option<&str>) -> NewAccount {
        NewAccount {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: "hash".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            phone: phone.map(str::to_string),
            role: UserRole::User,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_or_phone_is_rejected() {
        let store = MemoryAccountStore::new();
        store.insert(&new_account("a@x.com", Some("555"))).await.unwrap();

        assert!(matches!(
            store.insert(&new_account("a@x.com", None)).await,
            Err(StoreError::Duplicate(_))
        ));
        assert!(matches!(
            store.insert(&new_account("b@x.com", Some("555"))).await,
            Err(StoreError::Duplicate(_))
        ));
        assert!(store.insert(&new_account("c@x.com", None)).await.is_ok());
        assert!(store.insert(&new_account("d@x.com", None)).await.is_ok());
    }

    #[tokio::test]
    async fn update_tokens_requires_existing_account() {
        let store = MemoryAccountStore::new();
        let result = store.update_tokens(Uuid::new_v4(), "a", "r", Utc::now()).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
        assert_eq!(store.list(ListPage::new(None, None)).await.unwrap().0, 0);
    }

    #[tokio::test]
    async fn list_pages_in_creation_order() {
        let store = MemoryAccountStore::new();
        let start = Utc::now();
        for i in 0..5 {
            let mut account = new_account(&format!("user{i}@x.com"), None);
            account.created_at = start + chrono::Duration::seconds(i);
            store.insert(&account).await.unwrap();
        }

        let (total, page) = store.list(ListPage::new(Some(2), Some(2))).await.unwrap();
        assert_eq!(total, 5);
        let emails: Vec<&str> = page.iter().map(|a| a.email.as_str()).collect();
        assert_eq!(emails, vec!["user2@x.com", "user3@x.com"]);
    }
}
