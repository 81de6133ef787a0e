use super::{Credentials, INVALID_BODY};
use crate::auth::AccountService;
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
    path= "/authenticate",
    request_body = Credentials,
    responses (
        (status = 200, description = "Bearer token for the account", body = String, content_type = "text/plain"),
        (status = 400, description = "Invalid email or request body", body = String),
        (status = 401, description = "Unknown email or wrong password", body = String),
        (status = 500, description = "Internal error", body = String),
    ),
    tag= "accounts"
)]
#[instrument(skip(service, payload))]
pub async fn login(
    service: Extension<Arc<AccountService>>,
    payload: Option<Json<Credentials>>,
) -> Response {
    let Some(Json(credentials)) = payload else {
        return (StatusCode::BAD_REQUEST, INVALID_BODY).into_response();
    };

    match service.login(&credentials.email, &credentials.password).await {
        Ok(token) => (StatusCode::OK, token).into_response(),
        Err(err) => err.into_response(),
    }
}
