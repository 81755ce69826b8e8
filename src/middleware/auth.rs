use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::{
    errors::{ApiError, AuthError},
    models::auth::RequestIdentity,
    services::metrics,
    AppState,
};

/// Header carrying the access token.
pub const TOKEN_HEADER: &str = "token";

/// Validates the `token` header and attaches the caller's [`RequestIdentity`]
/// to the request before any protected handler runs.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = request
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    let identity = match state.validator.validate(presented) {
        Ok(identity) => identity,
        Err(e) => {
            metrics::record_validation(e.label());
            tracing::debug!("rejected request to {}: {e}", request.uri().path());
            return Err(e.into());
        }
    };
    metrics::record_validation("ok");

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for RequestIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestIdentity>()
            .cloned()
            .ok_or(ApiError::Auth(AuthError::MissingToken))
    }
}
