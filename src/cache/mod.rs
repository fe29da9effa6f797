// 缓存模块
// 令牌 -> 用户ID 的缓存，条目按令牌剩余有效期自动过期

pub mod memory;
pub mod operations;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use memory::MemoryTokenCache;
pub use operations::token::RedisTokenCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("cached value is not a user id: {0:?}")]
    CorruptValue(String),
    #[error("ttl must be positive")]
    InvalidTtl,
}

/// 带过期时间的键值缓存
///
/// `get` 返回 `Ok(None)` 表示未命中。`set` 返回后写入对所有调用方可见，
/// 超过 `ttl` 后视为不存在。
#[async_trait]
pub trait TokenCache: Send + Sync {
    async fn get(&self, token: &str) -> Result<Option<u64>, CacheError>;

    /// `ttl` 为零时返回 [`CacheError::InvalidTtl`]
    async fn set(&self, token: &str, user_id: u64, ttl: Duration) -> Result<(), CacheError>;

    /// 写入直到 `expires_at` 为止，默认实现在写入时刻换算成 `ttl`
    async fn set_until(
        &self,
        token: &str,
        user_id: u64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        let ttl = ttl_until(expires_at, Utc::now()).ok_or(CacheError::InvalidTtl)?;
        self.set(token, user_id, ttl).await
    }
}

/// 距 `expires_at` 的剩余时间（毫秒精度），已过期返回 `None`
pub(crate) fn ttl_until(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<Duration> {
    (expires_at - now)
        .to_std()
        .ok()
        .map(|left| Duration::from_millis(u64::try_from(left.as_millis()).unwrap_or(u64::MAX)))
        .filter(|ttl| !ttl.is_zero())
}

pub(crate) fn parse_user_id(value: &str) -> Result<u64, CacheError> {
    value
        .parse()
        .map_err(|_| CacheError::CorruptValue(value.to_string()))
}
