use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    errors::StoreError,
    models::account::{Account, ListPage, NewAccount},
};

/// Persistence for account records, injected wherever accounts are read or written.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account; `Duplicate` when the email or phone is already used
    async fn insert(&self, account: &NewAccount) -> Result<Account, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    async fn email_or_phone_taken(&self, email: &str, phone: Option<&str>) -> Result<bool, StoreError>;

    /// Overwrite the stored token pair and `updated_at`; `NotFound` when no account matched
    async fn update_tokens(
        &self,
        id: Uuid,
        access_token: &str,
        refresh_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// One page of accounts ordered by creation time, plus the total count
    async fn list(&self, page: ListPage) -> Result<(u64, Vec<Account>), StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, first_name, last_name, phone, role,
    access_token, refresh_token, created_at, updated_at";

pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate("this email or phone number already exists".into())
        }
        _ => StoreError::Database(e),
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: &NewAccount) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO accounts (id, email, password_hash, first_name, last_name, phone, role, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.phone)
        .bind(account.role.to_string())
        .bind(account.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    async fn email_or_phone_taken(&self, email: &str, phone: Option<&str>) -> Result<bool, StoreError> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM accounts
                WHERE email = $1 OR ($2::TEXT IS NOT NULL AND phone = $2)
            )",
        )
        .bind(email)
        .bind(phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn update_tokens(
        &self,
        id: Uuid,
        access_token: &str,
        refresh_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE accounts
             SET access_token = $2, refresh_token = $3, updated_at = $4
             WHERE id = $1",
        )
        .bind(id)
        .bind(access_token)
        .bind(refresh_token)
        .bind(updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self, page: ListPage) -> Result<(u64, Vec<Account>), StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;

        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts
             ORDER BY created_at, id
             LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page.per_page))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok((total.max(0) as u64, accounts))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
