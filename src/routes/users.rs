use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::{
    errors::ApiError,
    models::{
        account::{AccountListResponse, AccountProfile, ListPage, ListUsersQuery, UserRole},
        auth::RequestIdentity,
    },
    services::guard::{require_role, require_self_or_admin},
    AppState,
};

/// List all accounts, one page at a time. Admins only.
pub async fn list_users(
    State(state): State<AppState>,
    caller: RequestIdentity,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<AccountListResponse>, ApiError> {
    require_role(&caller, UserRole::Admin)?;

    let page = ListPage::new(query.page, query.per_page);
    let (total_count, accounts) = state.accounts.list(page).await?;

    Ok(Json(AccountListResponse {
        total_count,
        page: page.page,
        per_page: page.per_page,
        user_items: accounts.into_iter().map(AccountProfile::from).collect(),
    }))
}

/// Fetch one account. Callers may read their own; admins may read any.
pub async fn get_user(
    State(state): State<AppState>,
    caller: RequestIdentity,
    Path(user_id): Path<String>,
) -> Result<Json<AccountProfile>, ApiError> {
    // canonical form, so an upper-case spelling of the caller's own id still matches
    let id: Uuid = user_id.parse().map_err(|_| ApiError::NotFound)?;
    require_self_or_admin(&caller, &id.to_string())?;

    state
        .accounts
        .find_by_id(id)
        .await?
        .map(|a| Json(AccountProfile::from(a)))
        .ok_or(ApiError::NotFound)
}

pub async fn me(
    State(state): State<AppState>,
    caller: RequestIdentity,
) -> Result<Json<AccountProfile>, ApiError> {
    let id: Uuid = caller.account_id.parse().map_err(|_| ApiError::NotFound)?;
    state
        .accounts
        .find_by_id(id)
        .await?
        .map(|a| Json(AccountProfile::from(a)))
        .ok_or(ApiError::NotFound)
}
