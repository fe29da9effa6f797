use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// 令牌缓存后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCacheBackend {
    Redis,
    Memory,
}

impl FromStr for TokenCacheBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub auth_url: String,
    pub auth_timeout_secs: u64,
    pub token_cache: TokenCacheBackend,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub db_max_connections: u32,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let token_cache = parse_or("TOKEN_CACHE", TokenCacheBackend::Redis)?;
        let redis_url = env::var("REDIS_URL").ok();
        if token_cache == TokenCacheBackend::Redis && redis_url.is_none() {
            return Err(ConfigError::Missing("REDIS_URL"));
        }

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            redis_url,
            auth_url: required("AUTH_URL")?,
            auth_timeout_secs: parse_or("AUTH_TIMEOUT_SECS", 5)?,
            token_cache,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: parse_or("SERVER_PORT", 3000)?,
            api_base_uri: base_uri(env::var("API_BASE_URI").unwrap_or_else(|_| "/api".into()))?,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,
            run_migrations: parse_or("RUN_MIGRATIONS", true)?,
        })
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

/// 路由前缀必须以 `/` 开头，且不能含空白或路径参数语法
fn base_uri(value: String) -> Result<String, ConfigError> {
    let valid = value.starts_with('/')
        && !value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '{' | '}' | '*' | '?' | '#'));
    if !valid {
        return Err(ConfigError::Invalid {
            name: "API_BASE_URI",
            value,
        });
    }
    Ok(value)
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
