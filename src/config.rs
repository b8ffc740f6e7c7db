/*
 * Responsibility
 * - 環境変数の読み込み (APPROOV_BASE64_SECRET, SERVER_HOSTNAME, HTTP_PORT など)
 *   - .env は app::run() が先に読み込む
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};

use axum::http::{HeaderName, header};

use crate::services::attestation::{PathSelector, Secret, token::DEFAULT_MAX_TOKEN_LENGTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        Self::parse(std::env::var("APP_ENV").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
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

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // Decoded once here; never changes afterwards.
    pub secret: Secret,

    pub protected_paths: PathSelector,
    pub token_binding_enabled: bool,
    pub token_header: HeaderName,
    pub binding_header: HeaderName,
    pub max_token_length: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let hostname = lookup("SERVER_HOSTNAME").unwrap_or_else(|| "localhost".to_string());

        let port: u16 = match lookup("HTTP_PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("HTTP_PORT"))?,
            None => 8002,
        };

        let addr = (hostname.as_str(), port)
            .to_socket_addrs()
            .map_err(|_| ConfigError::Invalid("SERVER_HOSTNAME"))?
            .next()
            .ok_or(ConfigError::Invalid("SERVER_HOSTNAME"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let secret =
            lookup("APPROOV_BASE64_SECRET").ok_or(ConfigError::Missing("APPROOV_BASE64_SECRET"))?;
        let secret =
            Secret::from_base64(&secret).map_err(|_| ConfigError::Invalid("APPROOV_BASE64_SECRET"))?;

        let protected_paths = lookup("APPROOV_PROTECTED_PATHS")
            .map(|v| PathSelector::from_csv(&v))
            .unwrap_or_else(PathSelector::all);

        let token_binding_enabled = match lookup("APPROOV_TOKEN_BINDING_ENABLED") {
            Some(v) => parse_bool(&v).ok_or(ConfigError::Invalid("APPROOV_TOKEN_BINDING_ENABLED"))?,
            None => true,
        };

        let token_header = header_from(&lookup, "APPROOV_TOKEN_HEADER")?
            .unwrap_or_else(|| HeaderName::from_static("approov-token"));

        let binding_header =
            header_from(&lookup, "APPROOV_BINDING_HEADER")?.unwrap_or(header::AUTHORIZATION);

        let max_token_length = match lookup("APPROOV_MAX_TOKEN_LENGTH") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|v| *v > 0)
                .ok_or(ConfigError::Invalid("APPROOV_MAX_TOKEN_LENGTH"))?,
            None => DEFAULT_MAX_TOKEN_LENGTH,
        };

        Ok(Self {
            addr,
            app_env,
            secret,
            protected_paths,
            token_binding_enabled,
            token_header,
            binding_header,
            max_token_length,
        })
    }
}

fn header_from(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<HeaderName>, ConfigError> {
    match lookup(key) {
        Some(v) => HeaderName::from_bytes(v.trim().as_bytes())
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key)),
        None => Ok(None),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
