use std::env::VarError;
use std::fmt;

use thiserror::Error;
use zeroize::Zeroize;

pub const URL_VAR: &str = "SUPABASE_URL";
pub const SERVICE_KEY_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("missing required environment variable {0}")]
    Missing(String),

    #[error("environment variable {0} is not valid unicode")]
    NotUnicode(String),
}

/// Endpoint URL plus service-role key. The key grants full database access,
/// so it never shows up in `Debug` output and is wiped on drop.
#[derive(Clone)]
pub struct Credentials {
    url: String,
    service_key: String,
}

impl Credentials {
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_key: service_key.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn service_key(&self) -> &str {
        &self.service_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("service_key", &"****")
            .finish()
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.service_key.zeroize();
    }
}

/// Where the handler gets its privileged identity from.
///
/// `resolve` is called once per request; implementations must not cache
/// unless they can tell when the underlying values change.
pub trait CredentialSource: Send + Sync {
    fn resolve(&self) -> Result<Credentials, CredentialsError>;
}

/// Fixed credentials, mainly for tests and embedding.
impl CredentialSource for Credentials {
    fn resolve(&self) -> Result<Credentials, CredentialsError> {
        Ok(self.clone())
    }
}

/// Reads the endpoint and key from the process environment on every call.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    url_var: String,
    key_var: String,
}

impl EnvCredentials {
    pub fn new(url_var: impl Into<String>, key_var: impl Into<String>) -> Self {
        Self {
            url_var: url_var.into(),
            key_var: key_var.into(),
        }
    }

    fn resolve_with<F>(&self, lookup: F) -> Result<Credentials, CredentialsError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let url = read_var(&self.url_var, &lookup)?;
        let service_key = read_var(&self.key_var, &lookup)?;
        Ok(Credentials::new(url, service_key))
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new(URL_VAR, SERVICE_KEY_VAR)
    }
}

impl CredentialSource for EnvCredentials {
    fn resolve(&self) -> Result<Credentials, CredentialsError> {
        self.resolve_with(|name| std::env::var(name))
    }
}

// Empty counts as missing: a blank URL or key can never authenticate.
fn read_var<F>(name: &str, lookup: &F) -> Result<String, CredentialsError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    match lookup(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        Ok(_) | Err(VarError::NotPresent) => {
            Err(CredentialsError::Missing(name.to_string()))
        }
        Err(VarError::NotUnicode(_)) => {
            Err(CredentialsError::NotUnicode(name.to_string()))
        }
    }
}
