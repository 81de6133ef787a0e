use crate::{
    auth::{AccountService, AuthError},
    store::Account,
};
use axum::{
    extract::Extension,
    http::{header::AUTHORIZATION, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

#[utoipa::path(
    get,
    path= "/accounts/me",
    responses (
        (status = 200, description = "Account the bearer token was issued for", body = Account, content_type = "application/json"),
        (status = 401, description = "Missing or invalid bearer token", body = String),
        (status = 500, description = "Internal error", body = String),
    ),
    security(("bearer" = [])),
    tag= "accounts"
)]
#[instrument(skip_all)]
pub async fn me(service: Extension<Arc<AccountService>>, headers: HeaderMap) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return AuthError::Unauthorized.into_response();
    };

    let result = match service.authenticate(token) {
        Ok(id) => service.account(id).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(account) => Json(account).into_response(),
        Err(err) => err.into_response(),
    }
}
