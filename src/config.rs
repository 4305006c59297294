use anyhow::Context;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_PROCEDURE: &str = "cleanup_old_games";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Name of the remote procedure invoked on every cleanup request.
    /// Set via CLEANUP_PROCEDURE env var. Default: cleanup_old_games.
    pub procedure: String,
    pub log_format: LogFormat,
}

/// Loads process configuration from the environment (and `.env`, if present).
///
/// Supabase credentials are deliberately absent: they are resolved per request
/// by [`crate::supabase::credentials::CredentialSource`].
pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let port = match std::env::var("CLEANUP_PORT") {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid CLEANUP_PORT: {raw:?}"))?,
        Err(_) => DEFAULT_PORT,
    };

    let procedure = std::env::var("CLEANUP_PROCEDURE")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_PROCEDURE.into());

    Ok(Config {
        port,
        procedure,
        log_format: parse_log_format(std::env::var("CLEANUP_LOG_FORMAT").ok().as_deref())?,
    })
}

fn parse_log_format(raw: Option<&str>) -> anyhow::Result<LogFormat> {
    match raw.map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        None | Some("") | Some("text") => Ok(LogFormat::Text),
        Some("json") => Ok(LogFormat::Json),
        Some(other) => anyhow::bail!("invalid CLEANUP_LOG_FORMAT: {other:?} (expected text or json)"),
    }
}
