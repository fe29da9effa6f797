use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::cache::{CacheError, TokenCache};

#[derive(Debug, Clone, Copy)]
struct Entry {
    user_id: u64,
    expires_at: Instant,
}

/// 进程内令牌缓存
///
/// 过期条目在读取时惰性删除，`spawn_sweeper` 会定期清理从未再被读取的条目。
#[derive(Debug, Default)]
pub struct MemoryTokenCache {
    entries: DashMap<String, Entry>,
}

impl MemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 未过期条目的剩余有效期
    pub fn ttl(&self, token: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .get(token)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.expires_at - now)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let purged = self.purge_expired();
                if purged > 0 {
                    tracing::debug!("Purged {} expired token cache entries", purged);
                }
            }
        })
    }
}

#[async_trait]
impl TokenCache for MemoryTokenCache {
    async fn get(&self, token: &str) -> Result<Option<u64>, CacheError> {
        let now = Instant::now();
        let found = self
            .entries
            .get(token)
            .map(|entry| (entry.user_id, entry.expires_at > now));

        match found {
            Some((user_id, true)) => Ok(Some(user_id)),
            Some((_, false)) => {
                self.entries
                    .remove_if(token, |_, entry| entry.expires_at <= now);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, token: &str, user_id: u64, ttl: Duration) -> Result<(), CacheError> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl);
        }

        self.entries.insert(
            token.to_string(),
            Entry {
                user_id,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}
