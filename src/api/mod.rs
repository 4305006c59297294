use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{header, HeaderName, HeaderValue},
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::supabase::CredentialSource;

pub mod cleanup;

/// Permissive CORS headers attached to every response, preflight included.
pub const CORS_HEADERS: [(HeaderName, &str); 2] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        "authorization, x-client-info, apikey, content-type",
    ),
];

/// Shared application state passed to handlers.
///
/// Holds nothing request-specific: credentials are resolved through
/// `credentials` on every call.
pub struct AppState {
    pub http: reqwest::Client,
    pub credentials: Arc<dyn CredentialSource>,
    pub procedure: String,
}

impl AppState {
    pub fn new(
        procedure: impl Into<String>,
        credentials: Arc<dyn CredentialSource>,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(concat!("cleanup-games/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            credentials,
            procedure: procedure.into(),
        })
    }
}

/// Build the service router. Everything except `GET /healthz` runs the cleanup.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/healthz",
            get(|| async { "ok" }).fallback(cleanup::cleanup_handler),
        )
        .fallback(any(cleanup::cleanup_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
}

/// Middleware: injects a unique X-Request-Id into every response.
/// This allows callers to correlate failures with service logs.
async fn request_id_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!("request", request_id = %req_id);
    let mut resp = next.run(req).instrument(span).await;
    if let Ok(val) = HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}
