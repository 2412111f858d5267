//! Process configuration read from environment variables.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `STOREFRONT_BIND_ADDR` | `0.0.0.0:8080` | HTTP listen address |
//! | `JWT_SECRET` | `dev-secret` (warns) | HS256 key for bearer tokens |
//! | `STOREFRONT_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `STOREFRONT_SEED_DEMO` | `false` | Load the demo catalog at startup |
//! | `DATABASE_URL` | unset | Postgres URL (only with the `postgres` feature) |

use std::net::SocketAddr;

use thiserror::Error;

use storefront_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub log_format: LogFormat,
    pub seed_demo: bool,
    pub database_url: Option<String>,
}

impl StorefrontConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bind_addr = get("STOREFRONT_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("STOREFRONT_BIND_ADDR", e.to_string()))?;

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string());

        let log_format = match get("STOREFRONT_LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid("STOREFRONT_LOG_FORMAT", e.to_string()))?,
            None => LogFormat::default(),
        };

        let seed_demo = match get("STOREFRONT_SEED_DEMO") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                ConfigError::invalid("STOREFRONT_SEED_DEMO", format!("expected true/false, got '{raw}'"))
            })?,
            None => false,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            log_format,
            seed_demo,
            database_url: get("DATABASE_URL"),
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
