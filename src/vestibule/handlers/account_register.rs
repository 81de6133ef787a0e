use super::{Credentials, INVALID_BODY};
use crate::{auth::AccountService, store::Account};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

#[utoipa::path(
    post,
    path= "/accounts",
    request_body = Credentials,
    responses (
        (status = 201, description = "Account created", body = Account, content_type = "application/json"),
        (status = 400, description = "Invalid email, password or request body", body = String),
        (status = 409, description = "An account with this email already exists", body = String),
        (status = 500, description = "Internal error", body = String),
    ),
    tag= "accounts"
)]
#[instrument(skip(service, payload))]
pub async fn register(
    service: Extension<Arc<AccountService>>,
    payload: Option<Json<Credentials>>,
) -> Response {
    let Some(Json(credentials)) = payload else {
        return (StatusCode::BAD_REQUEST, INVALID_BODY).into_response();
    };

    match service
        .register(&credentials.email, &credentials.password)
        .await
    {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(err) => err.into_response(),
    }
}
