/*
 * Responsibility
 * - 環境変数の読み込み (PORT, APP_ENV, JWT_* など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::middleware::http::HttpLimits;
use crate::services::auth::{NumericDates, ParserSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value
            .unwrap_or("development")
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Self::Production => "info",
            Self::Development => "debug",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub jwt_algorithm: String,
    pub jwt_signing_key: Vec<u8>,
    // public key pem, only for asymmetric algorithms
    pub jwt_verify_key: Vec<u8>,
    pub jwt_query_aliases: Vec<String>,
    pub jwt_leeway_seconds: u64,
    pub jwt_strict_numeric_dates: bool,

    pub request_timeout_seconds: u64,
    pub body_limit_bytes: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("jwt_query_aliases", &self.jwt_query_aliases)
            .field("jwt_leeway_seconds", &self.jwt_leeway_seconds)
            .field("jwt_strict_numeric_dates", &self.jwt_strict_numeric_dates)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match var("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(var("APP_ENV").as_deref());

        let jwt_algorithm = var("JWT_ALGORITHM")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "HS256".to_string());

        let jwt_signing_key = var("JWT_SIGNING_KEY")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SIGNING_KEY"))?
            .replace("\\n", "\n")
            .into_bytes();

        let jwt_verify_key = var("JWT_VERIFY_KEY")
            .unwrap_or_default()
            .replace("\\n", "\n")
            .into_bytes();

        let jwt_query_aliases = var("JWT_QUERY_ALIASES")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_leeway_seconds = match var("JWT_LEEWAY_SECONDS") {
            Some(v) => v
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("JWT_LEEWAY_SECONDS"))?,
            None => 0,
        };

        let jwt_strict_numeric_dates = match var("JWT_STRICT_NUMERIC_DATES").as_deref() {
            None | Some("") => false,
            Some(v) => parse_bool(v).ok_or(ConfigError::Invalid("JWT_STRICT_NUMERIC_DATES"))?,
        };

        let request_timeout_seconds = match var("REQUEST_TIMEOUT_SECONDS") {
            Some(v) => v
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"))?,
            None => 30,
        };

        let body_limit_bytes = match var("BODY_LIMIT_BYTES") {
            Some(v) => v
                .parse::<usize>()
                .map_err(|_| ConfigError::Invalid("BODY_LIMIT_BYTES"))?,
            None => 1024 * 1024,
        };

        Ok(Self {
            addr,
            app_env,
            jwt_algorithm,
            jwt_signing_key,
            jwt_verify_key,
            jwt_query_aliases,
            jwt_leeway_seconds,
            jwt_strict_numeric_dates,
            request_timeout_seconds,
            body_limit_bytes,
        })
    }

    pub fn parser_settings(&self) -> ParserSettings {
        ParserSettings {
            valid_methods: vec![self.jwt_algorithm.clone()],
            leeway_seconds: self.jwt_leeway_seconds,
            skip_claims_validation: false,
            numeric_dates: if self.jwt_strict_numeric_dates {
                NumericDates::Strict
            } else {
                NumericDates::Lenient
            },
        }
    }

    pub fn http_limits(&self) -> HttpLimits {
        HttpLimits {
            body_limit_bytes: self.body_limit_bytes,
            timeout: Duration::from_secs(self.request_timeout_seconds),
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
