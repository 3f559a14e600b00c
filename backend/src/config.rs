// src/config.rs

use std::{env, str::FromStr};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Uploads above this size are rejected before they reach the parser.
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 4 * 1024 * 1024;

pub const DEFAULT_HTTP_PORT: u16 = 5000;

/// Origin of the bundled frontend dev server; always allowed by CORS.
pub const DEV_FRONTEND_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Staging,
    Production,
}

impl FromStr for AppEnv {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnv::Development),
            "staging" | "stage" => Ok(AppEnv::Staging),
            "production" | "prod" => Ok(AppEnv::Production),
            _ => Ok(AppEnv::Development), // default if unknown
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub env: AppEnv,

    /// Postgres connection string.
    ///
    /// When unset the server falls back to the in-process store, which is
    /// fine for local demos but loses everything on restart.
    pub database_url: Option<String>,
    pub http_port: u16,

    /// Maximum accepted request body for `POST /upload`, in bytes.
    pub upload_max_bytes: usize,

    /// Extra CORS origin for the deployed frontend.
    pub frontend_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: AppEnv::Development,
            database_url: None,
            http_port: DEFAULT_HTTP_PORT,
            upload_max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
            frontend_url: None,
        }
    }
}

/// Entry point to load configuration
pub fn load() -> Result<Config> {
    load_dotenv();
    Config::from_env()
}

/// Load .env base, then .env.{APP_ENV}
fn load_dotenv() {
    // 1. Load base .env (if it exists)
    let _ = dotenvy::dotenv();

    // 2. Read APP_ENV from env (may come from .env)
    let env_name = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

    // 3. Try to load .env.{APP_ENV}, e.g. .env.development
    let filename = format!(".env.{}", env_name);
    let _ = dotenvy::from_filename(&filename);
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_str = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());
        let env = AppEnv::from_str(&env_str).unwrap_or(AppEnv::Development);

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let http_port = parse_or_default(&lookup, "HTTP_PORT", "u16", DEFAULT_HTTP_PORT)?;
        let upload_max_bytes = parse_or_default(
            &lookup,
            "UPLOAD_MAX_BYTES",
            "byte count",
            DEFAULT_UPLOAD_MAX_BYTES,
        )?;

        let frontend_url = lookup("FRONTEND_URL").filter(|url| !url.trim().is_empty());

        Ok(Self {
            env,
            database_url,
            http_port,
            upload_max_bytes,
            frontend_url,
        })
    }

    /// Origins the CORS layer accepts.
    pub fn allowed_origins(&self) -> Vec<String> {
        let mut origins = vec![DEV_FRONTEND_ORIGIN.to_string()];
        if let Some(url) = &self.frontend_url {
            if url != DEV_FRONTEND_ORIGIN {
                origins.push(url.clone());
            }
        }
        origins
    }
}

fn parse_or_default<F, T>(lookup: &F, name: &'static str, expected: &'static str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name,
            expected,
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.env, AppEnv::Development);
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.http_port, DEFAULT_HTTP_PORT);
        assert_eq!(cfg.upload_max_bytes, DEFAULT_UPLOAD_MAX_BYTES);
        assert_eq!(cfg.allowed_origins(), vec![DEV_FRONTEND_ORIGIN.to_string()]);
    }

    #[test]
    fn reads_explicit_values() {
        let cfg = config_from(&[
            ("APP_ENV", "prod"),
            ("DATABASE_URL", "postgres://localhost/dispatch"),
            ("HTTP_PORT", "8080"),
            ("UPLOAD_MAX_BYTES", "1024"),
            ("FRONTEND_URL", "https://dispatch.example.com"),
        ])
        .unwrap();

        assert_eq!(cfg.env, AppEnv::Production);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/dispatch"));
        assert_eq!(cfg.http_port, 8080);
        assert_eq!(cfg.upload_max_bytes, 1024);
        assert_eq!(cfg.allowed_origins().len(), 2);
    }

    #[test]
    fn blank_database_url_means_in_process_store() {
        let cfg = config_from(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(cfg.database_url.is_none());
    }

    #[test]
    fn rejects_bad_port() {
        let err = config_from(&[("HTTP_PORT", "seventy")]).unwrap_err();
        assert!(err.to_string().contains("HTTP_PORT"));
    }

    #[test]
    fn unknown_env_falls_back_to_development() {
        let cfg = config_from(&[("APP_ENV", "qa")]).unwrap();
        assert_eq!(cfg.env, AppEnv::Development);
    }
}
