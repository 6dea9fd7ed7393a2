//! Runtime settings read from the environment (and `.env`, when present).

use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;

use crate::cache::{DATA_TTL, LIBRARY_TTL};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    /// Base URL the OAuth providers redirect back to.
    pub public_url: String,
    pub client_secret_path: String,
    pub data_ttl: Duration,
    pub library_ttl: Duration,
    pub session_idle: time::Duration,
    pub seed_library: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!(error = %e, "no .env loaded");
        }

        Ok(Self {
            database_url: var_or("DATABASE_URL", "sqlite://skillswap.db")?,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 16)?,
            bind_addr: parse_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            public_url: var_or("PUBLIC_URL", "http://localhost:8080")?,
            client_secret_path: var_or("CLIENT_SECRET_PATH", "client_secret.json")?,
            data_ttl: Duration::from_secs(parse_or("CACHE_TTL_SECS", DATA_TTL.as_secs())?),
            library_ttl: Duration::from_secs(parse_or("LIBRARY_CACHE_TTL_SECS", LIBRARY_TTL.as_secs())?),
            session_idle: time::Duration::minutes(parse_or("SESSION_IDLE_MINUTES", 60)?),
            seed_library: parse_or("SEED_LIBRARY", true)?,
        })
    }
}

fn var_or(key: &str, default: &str) -> anyhow::Result<String> {
    match dotenv::var(key) {
        Ok(value) => Ok(value),
        Err(dotenv::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(default.to_owned()),
        Err(e) => Err(e).with_context(|| format!("reading {key}")),
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match dotenv::var(key) {
        Ok(value) => value.parse().with_context(|| format!("parsing {key}={value}")),
        Err(dotenv::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(default),
        Err(e) => Err(e).with_context(|| format!("reading {key}")),
    }
}
