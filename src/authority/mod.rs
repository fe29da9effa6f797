//! 令牌授权服务客户端
//!
//! 外部授权服务负责签发令牌，本服务只通过 `GET {AUTH_URL}/{token}`
//! 把令牌解析为用户ID和过期时间。

mod http;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use http::HttpTokenAuthority;

/// 授权服务返回的令牌解析结果
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolvedToken {
    pub token: String,
    pub user_id: u64,
    /// Unix 时间戳，单位秒
    pub expires_at: i64,
}

#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("invalid authority url: {0}")]
    InvalidBaseUrl(String),
    #[error("authority unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("authority rejected token with status {0}")]
    Rejected(u16),
    #[error("failed to decode authority response: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("authority answered for a different token")]
    TokenMismatch,
}

#[async_trait]
pub trait TokenAuthority: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<ResolvedToken, AuthorityError>;
}
