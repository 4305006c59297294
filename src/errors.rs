use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::api::cleanup::CleanupResponse;
use crate::api::CORS_HEADERS;
use crate::supabase::{CredentialsError, ProcedureError, RpcError};

/// Everything that can end a cleanup invocation without a result.
///
/// Both variants map to HTTP 500; they differ in what gets logged and in
/// where the message comes from.
#[derive(Debug, Error)]
pub enum CleanupError {
    /// The remote procedure reported a domain-level error.
    #[error("{0}")]
    Procedure(ProcedureError),

    /// Configuration, transport or decoding fault.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl CleanupError {
    /// Message placed in the `error` field of the response envelope.
    pub fn message(&self) -> String {
        match self {
            CleanupError::Procedure(e) => e.message.clone(),
            // alternate form joins the whole source chain
            CleanupError::Unexpected(e) => format!("{:#}", e),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    pub fn log(&self) {
        match self {
            CleanupError::Procedure(e) => tracing::error!(
                code = e.code.as_deref().unwrap_or(""),
                details = e.details.as_deref().unwrap_or(""),
                hint = e.hint.as_deref().unwrap_or(""),
                "cleanup error: {}",
                e.message
            ),
            CleanupError::Unexpected(e) => tracing::error!("unexpected error: {:#}", e),
        }
    }
}

impl From<RpcError> for CleanupError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Procedure(e) => CleanupError::Procedure(e),
            other => CleanupError::Unexpected(other.into()),
        }
    }
}

impl From<CredentialsError> for CleanupError {
    fn from(err: CredentialsError) -> Self {
        CleanupError::Unexpected(err.into())
    }
}

impl IntoResponse for CleanupError {
    fn into_response(self) -> Response {
        self.log();
        let body = Json(CleanupResponse::failed(self.message()));
        (self.status(), CORS_HEADERS, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procedure_error_message_is_verbatim() {
        let err: CleanupError = RpcError::Procedure(ProcedureError::new("boom")).into();
        assert!(matches!(err, CleanupError::Procedure(_)));
        assert_eq!(err.message(), "boom");
    }

    #[test]
    fn test_missing_credentials_are_unexpected() {
        let err: CleanupError = CredentialsError::Missing("SUPABASE_URL".into()).into();
        assert!(matches!(err, CleanupError::Unexpected(_)));
        assert_eq!(
            err.message(),
            "missing required environment variable SUPABASE_URL"
        );
    }

    #[test]
    fn test_unexpected_message_includes_source_chain() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let err: CleanupError = RpcError::InvalidUrl {
            url: "not a url".into(),
            source: parse_err,
        }
        .into();
        assert_eq!(
            err.message(),
            format!("invalid service url \"not a url\": {}", parse_err)
        );
    }

    #[test]
    fn test_every_error_maps_to_500() {
        let procedure = CleanupError::Procedure(ProcedureError::new("boom"));
        let unexpected = CleanupError::Unexpected(anyhow::anyhow!("connection refused"));
        assert_eq!(procedure.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(unexpected.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(unexpected.message(), "connection refused");
    }
}
