// Library exports for binary tools and tests
pub mod config;
pub mod db;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use config::Config;
use db::AccountStore;
use errors::AuthError;
use services::{auth::AuthService, codec::ClaimsCodec, tokens::TokenIssuer, validator::TokenValidator};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub auth: AuthService,
    pub validator: TokenValidator,
}

impl AppState {
    /// Wire the token services around one signing secret. Fails on bad token configuration.
    pub fn new(config: &Config, accounts: Arc<dyn AccountStore>) -> Result<Self, AuthError> {
        let codec = Arc::new(ClaimsCodec::new(&config.jwt_secret)?);
        let issuer = TokenIssuer::new(
            codec.clone(),
            config.access_token_ttl_seconds,
            config.refresh_token_ttl_seconds,
        )?;

        Ok(Self {
            auth: AuthService::new(accounts.clone(), codec.clone(), issuer, config.bcrypt_cost)?,
            validator: TokenValidator::new(codec),
            accounts,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/users", get(routes::users::list_users))
        .route("/users/me", get(routes::users::me))
        .route("/users/{user_id}", get(routes::users::get_user))
        .route_layer(from_fn_with_state(state.clone(), middleware::auth::authenticate));

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::metrics::metrics_handler))
        // Auth
        .route("/users/signup", post(routes::auth::signup))
        .route("/users/login", post(routes::auth::login))
        .route("/users/refresh", post(routes::auth::refresh_token))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
