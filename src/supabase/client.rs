//! PostgREST RPC client bound to a service-role identity.
//!
//! Speaks the same wire format as `supabase.rpc(name)`:
//! `POST {url}/rest/v1/rpc/{name}` with the key in both `apikey` and
//! `Authorization`, and a JSON object of named arguments as the body.

use std::fmt;

use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use super::credentials::Credentials;

const CLIENT_INFO: &str = concat!("cleanup-games/", env!("CARGO_PKG_VERSION"));

/// Error descriptor returned by the database when a procedure fails.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProcedureError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl ProcedureError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            details: None,
            hint: None,
        }
    }

    /// Builds the descriptor for a non-2xx response. PostgREST normally sends
    /// a JSON object; proxies in front of it may not.
    fn from_response(status: StatusCode, body: &str) -> Self {
        if let Ok(parsed) = serde_json::from_str::<ProcedureError>(body) {
            return parsed;
        }
        let body = body.trim();
        if body.is_empty() {
            Self::new(status.to_string())
        } else {
            Self::new(body)
        }
    }
}

impl fmt::Display for ProcedureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Error)]
pub enum RpcError {
    /// The procedure ran (or was rejected) and reported an error.
    #[error("{0}")]
    Procedure(ProcedureError),

    #[error("invalid service url {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported service url scheme {0:?}: expected http or https")]
    UnsupportedScheme(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("malformed response from {function}")]
    Decode {
        function: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A client handle bound to one set of credentials.
///
/// Cheap to build: the connection pool lives in the shared `reqwest::Client`.
#[derive(Debug)]
pub struct ServiceClient {
    http: reqwest::Client,
    base: Url,
    credentials: Credentials,
}

impl ServiceClient {
    pub fn new(http: reqwest::Client, credentials: Credentials) -> Result<Self, RpcError> {
        let raw = credentials.url().trim_end_matches('/');
        let base = Url::parse(raw).map_err(|source| RpcError::InvalidUrl {
            url: credentials.url().to_string(),
            source,
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(RpcError::UnsupportedScheme(base.scheme().to_string()));
        }

        Ok(Self {
            http,
            base,
            credentials,
        })
    }

    /// Calls a database function with no arguments.
    pub async fn rpc(&self, function: &str) -> Result<Value, RpcError> {
        self.rpc_with_args(function, &Value::Object(Default::default()))
            .await
    }

    /// Calls a database function. The result is returned as-is; an empty
    /// body (a `void` function) becomes `null`.
    pub async fn rpc_with_args(&self, function: &str, args: &Value) -> Result<Value, RpcError> {
        let url = self.rpc_url(function)?;
        let key = self.credentials.service_key();

        tracing::debug!(%function, "calling remote procedure");

        let resp = self
            .http
            .post(url)
            .header("apikey", key)
            .bearer_auth(key)
            .header(ACCEPT, "application/json")
            .header("x-client-info", CLIENT_INFO)
            .json(args)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(RpcError::Procedure(ProcedureError::from_response(
                status, &body,
            )));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|source| RpcError::Decode {
            function: function.to_string(),
            source,
        })
    }

    fn rpc_url(&self, function: &str) -> Result<Url, RpcError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| RpcError::UnsupportedScheme(self.base.scheme().to_string()))?
            .pop_if_empty()
            .extend(["rest", "v1", "rpc", function]);
        Ok(url)
    }
}
