use crate::auth::AuthError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

const INTERNAL_MESSAGE: &str = "Something went wrong";

impl AuthError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // The cause stays in the logs, clients only get the generic message.
        if let Self::Internal(err) = &self {
            error!("{err:#}");
            return (status, INTERNAL_MESSAGE).into_response();
        }

        (status, self.to_string()).into_response()
    }
}
