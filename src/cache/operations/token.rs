use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Client as RedisClient, aio::MultiplexedConnection};

use crate::cache::{CacheError, TokenCache, parse_user_id};

/// 令牌缓存 (Redis)
///
/// 键为令牌原文，值为用户ID字符串，过期时间精确到毫秒。
/// `set_until` 使用 `SET .. PXAT`，过期时刻由 Redis 按绝对时间处理。
#[derive(Clone)]
pub struct RedisTokenCache {
    conn: MultiplexedConnection,
}

impl RedisTokenCache {
    /// 启动时建立一条多路复用连接，之后每次操作克隆使用
    pub async fn connect(redis: &RedisClient) -> Result<Self, CacheError> {
        let conn = redis.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl TokenCache for RedisTokenCache {
    async fn get(&self, token: &str) -> Result<Option<u64>, CacheError> {
        let mut conn = self.conn.clone();
        let result: Option<String> = conn.get(token).await?;

        result.as_deref().map(parse_user_id).transpose()
    }

    async fn set(&self, token: &str, user_id: u64, ttl: Duration) -> Result<(), CacheError> {
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        if millis == 0 {
            return Err(CacheError::InvalidTtl);
        }

        let mut conn = self.conn.clone();
        let _: () = conn.pset_ex(token, user_id.to_string(), millis).await?;

        Ok(())
    }

    async fn set_until(
        &self,
        token: &str,
        user_id: u64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        if expires_at <= Utc::now() {
            return Err(CacheError::InvalidTtl);
        }
        let at_millis =
            u64::try_from(expires_at.timestamp_millis()).map_err(|_| CacheError::InvalidTtl)?;

        let mut conn = self.conn.clone();
        let _: () = redis::cmd("SET")
            .arg(token)
            .arg(user_id.to_string())
            .arg("PXAT")
            .arg(at_millis)
            .query_async(&mut conn)
            .await?;

        Ok(())
    }
}
