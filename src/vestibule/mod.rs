//! HTTP surface: routes, middleware and the server loop.

use crate::{
    auth::AccountService,
    store::Account,
    vestibule::handlers::{health::Health, Credentials},
};
use anyhow::Result;
use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{get, post},
    Extension, Router,
};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

pub mod handlers;


#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

const REQUEST_ID: &str = "x-request-id";

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::account_register::register,
        handlers::account_login::login,
        handlers::account_me::me,
    ),
    components(
        schemas(Account, Credentials, Health)
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "accounts", description = "Account registration and authentication"),
        (name = "health", description = "Service status"),
    )
)]
struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the application router around `service`.
///
/// Every request gets an `x-request-id` (a ULID unless the client sent one),
/// which is echoed on the response and recorded on the request span. CORS
/// only covers the account routes so `OPTIONS /health` reaches its handler.
pub fn router(service: Arc<AccountService>, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, USER_AGENT])
        .allow_origin(Any);

    let accounts = Router::new()
        .route("/accounts", post(handlers::register))
        .route("/accounts/me", get(handlers::me))
        .route("/authenticate", post(handlers::login))
        .layer(cors);

    let app = Router::new()
        .route("/health", get(handlers::health).options(handlers::health))
        .merge(accounts);

    with_middleware(app, service, request_timeout)
}

/// Shared middleware: request ids, tracing, panic recovery, compression,
/// request timeout and the service extension.
fn with_middleware(app: Router, service: Arc<AccountService>, request_timeout: Duration) -> Router {
    app.layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static(REQUEST_ID),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                REQUEST_ID,
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(CatchPanicLayer::new())
            .layer(CompressionLayer::new())
            .layer(TimeoutLayer::new(request_timeout))
            .layer(Extension(service)),
    )
}

/// Serve the API on `[::]:port` until SIGINT or SIGTERM.
///
/// # Errors
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn new(port: u16, service: Arc<AccountService>, request_timeout: Duration) -> Result<()> {
    let app = router(service, request_timeout);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gracefully shutdown");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT"),
        () = terminate => info!("Received SIGTERM"),
    }
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let method = request.method().as_str();
    let path = request.uri().path();
    let request_id = request
        .headers()
        .get(REQUEST_ID)
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    info_span!("http.request", method, path, request_id)
}
