use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
///
/// Abuse-guard knobs (rate caps, sweep interval, history cap) are surfaced
/// here rather than buried as module constants so deployments can tune them.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Global kill switch for the assistant. When off, every turn is answered
    /// with a structured `disabled` reply instead of running the pipeline.
    pub assistant_enabled: bool,
    pub rate_limit_per_minute: usize,
    pub rate_limit_per_hour: usize,
    pub rate_limit_sweep_secs: u64,
    /// Rolling (user, bot) exchange pairs kept per chat session.
    pub session_history_cap: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            assistant_enabled: std::env::var("ASSISTANT_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            rate_limit_per_minute: parse_env("RATE_LIMIT_PER_MINUTE", 10)?,
            rate_limit_per_hour: parse_env("RATE_LIMIT_PER_HOUR", 50)?,
            rate_limit_sweep_secs: parse_env("RATE_LIMIT_SWEEP_SECS", 300)?,
            session_history_cap: parse_env("SESSION_HISTORY_CAP", 10)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("'{key}' must be a valid number")),
        Err(_) => Ok(default),
    }
}
