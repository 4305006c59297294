//! The cleanup endpoint.
//!
//! Any non-preflight request resolves the service-role credentials, calls the
//! configured database procedure once and relays its outcome as JSON.

use std::io::Write;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use super::{AppState, CORS_HEADERS};
use crate::errors::CleanupError;
use crate::supabase::ServiceClient;

/// JSON envelope returned for every non-preflight request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanupResponse {
    pub success: bool,
    /// Present on success, even when the procedure returned `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CleanupResponse {
    pub fn completed(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

pub async fn cleanup_handler(State(state): State<Arc<AppState>>, method: Method) -> Response {
    if method == Method::OPTIONS {
        return (StatusCode::OK, CORS_HEADERS, "ok").into_response();
    }

    match run_cleanup(&state).await {
        Ok(result) => (
            StatusCode::OK,
            CORS_HEADERS,
            Json(CleanupResponse::completed(result)),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Resolve credentials, bind a client and invoke the procedure once.
///
/// Logs the result on success; failures are logged by whoever reports them.
pub async fn run_cleanup(state: &AppState) -> Result<Value, CleanupError> {
    let credentials = state.credentials.resolve()?;
    let client = ServiceClient::new(state.http.clone(), credentials)?;
    let result = client.rpc(&state.procedure).await?;

    tracing::info!(procedure = %state.procedure, "cleanup completed: {}", result);
    Ok(result)
}

/// One-shot run for cron: writes the envelope to `out` as a single JSON line
/// and fails when the cleanup did.
pub async fn invoke<W: Write>(state: &AppState, out: &mut W) -> anyhow::Result<()> {
    let (envelope, failure) = match run_cleanup(state).await {
        Ok(result) => (CleanupResponse::completed(result), None),
        Err(e) => {
            e.log();
            let message = e.message();
            (CleanupResponse::failed(message.clone()), Some(message))
        }
    };

    serde_json::to_writer(&mut *out, &envelope)?;
    writeln!(out)?;

    match failure {
        Some(message) => anyhow::bail!("cleanup failed: {}", message),
        None => Ok(()),
    }
}
