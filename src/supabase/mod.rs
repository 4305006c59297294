//! Privileged access to a Supabase project.
//!
//! `credentials` resolves the service-role identity; `client` uses it to call
//! database functions through the PostgREST RPC endpoint.

pub mod client;
pub mod credentials;

pub use client::{ProcedureError, RpcError, ServiceClient};
pub use credentials::{CredentialSource, Credentials, CredentialsError, EnvCredentials};
