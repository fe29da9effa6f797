//! 认证中间件
//!
//! 请求进入业务逻辑前，先用 `Authorization` 头中的令牌换取用户ID：
//! 先查令牌缓存，未命中再请求授权服务，并按令牌剩余有效期写回缓存。
//! 解析出的 [`AuthUser`] 放入请求扩展，供后续处理函数读取。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use dashmap::{DashMap, mapref::entry::Entry};
use futures_util::future::{BoxFuture, FutureExt, Shared, WeakShared};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::authority::{AuthorityError, TokenAuthority};
use crate::cache::TokenCache;
use crate::utils::{error_codes, error_to_api_response, token_fingerprint};

type ResolveFuture = BoxFuture<'static, Result<u64, Arc<AuthorityError>>>;
type Resolution = Shared<ResolveFuture>;

/// 已认证用户
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: u64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to find token")]
    MissingCredential,
    #[error("Invalid token: {0}")]
    Unverifiable(Arc<AuthorityError>),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let code = match self {
            AuthError::MissingCredential => error_codes::MISSING_TOKEN,
            AuthError::Unverifiable(_) => error_codes::AUTH_FAILED,
        };
        (
            StatusCode::UNAUTHORIZED,
            error_to_api_response::<()>(code, self.to_string()),
        )
            .into_response()
    }
}

struct InFlight {
    id: u64,
    flight: WeakShared<ResolveFuture>,
}

/// 令牌校验门
///
/// 同一令牌的并发未命中共用一次授权服务调用和一次缓存写入，await 期间不持有锁。
pub struct AuthGate {
    cache: Arc<dyn TokenCache>,
    authority: Arc<dyn TokenAuthority>,
    inflight: DashMap<String, InFlight>,
    next_flight: AtomicU64,
}

impl AuthGate {
    pub fn new(cache: Arc<dyn TokenCache>, authority: Arc<dyn TokenAuthority>) -> Self {
        Self {
            cache,
            authority,
            inflight: DashMap::new(),
            next_flight: AtomicU64::new(0),
        }
    }

    pub async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        let fingerprint = token_fingerprint(token);

        match self.cache.get(token).await {
            Ok(Some(user_id)) => {
                debug!("Token cache hit: {}", fingerprint);
                return Ok(AuthUser { user_id });
            }
            Ok(None) => debug!("Token cache miss: {}", fingerprint),
            // 缓存故障按未命中处理
            Err(e) => warn!(
                "Token cache lookup failed for {}, falling back to authority: {}",
                fingerprint, e
            ),
        }

        let user_id = self.resolve(token).await.map_err(|e| {
            info!("Rejected token {}: {}", fingerprint, e);
            AuthError::Unverifiable(e)
        })?;

        Ok(AuthUser { user_id })
    }

    async fn resolve(&self, token: &str) -> Result<u64, Arc<AuthorityError>> {
        let (id, flight) = self.join_or_launch(token);
        let mut guard = FlightGuard {
            inflight: &self.inflight,
            token,
            id,
            flight,
            done: false,
        };

        let result = (&mut guard.flight).await;
        guard.done = true;
        result
    }

    fn join_or_launch(&self, token: &str) -> (u64, Resolution) {
        let id = self.next_flight.fetch_add(1, Ordering::Relaxed);
        match self.inflight.entry(token.to_string()) {
            Entry::Occupied(mut occupied) => {
                let current = occupied.get();
                if let Some(flight) = current.flight.upgrade().filter(|f| f.peek().is_none()) {
                    return (current.id, flight);
                }
                let flight = self.launch(token);
                match flight.downgrade() {
                    Some(weak) => {
                        occupied.insert(InFlight { id, flight: weak });
                    }
                    None => {
                        occupied.remove();
                    }
                }
                (id, flight)
            }
            Entry::Vacant(vacant) => {
                let flight = self.launch(token);
                if let Some(weak) = flight.downgrade() {
                    vacant.insert(InFlight { id, flight: weak });
                }
                (id, flight)
            }
        }
    }

    fn launch(&self, token: &str) -> Resolution {
        let cache = Arc::clone(&self.cache);
        let authority = Arc::clone(&self.authority);
        let token = token.to_string();

        async move { resolve_and_store(&*cache, &*authority, &token).await }
            .boxed()
            .shared()
    }
}

/// 解析完成或最后一个等待的请求离开时移除进行中的条目，后者同时取消授权服务调用
struct FlightGuard<'a> {
    inflight: &'a DashMap<String, InFlight>,
    token: &'a str,
    id: u64,
    flight: Resolution,
    done: bool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let done = self.done;
        let flight = &self.flight;
        self.inflight.remove_if(self.token, |_, entry| {
            entry.id == self.id && (done || flight.strong_count() == Some(1))
        });
    }
}

async fn resolve_and_store(
    cache: &dyn TokenCache,
    authority: &dyn TokenAuthority,
    token: &str,
) -> Result<u64, Arc<AuthorityError>> {
    let resolved = authority.resolve(token).await.map_err(Arc::new)?;
    let fingerprint = token_fingerprint(token);

    let expiry = DateTime::from_timestamp(resolved.expires_at, 0).filter(|at| *at > Utc::now());
    match expiry {
        Some(expires_at) => match cache.set_until(token, resolved.user_id, expires_at).await {
            Ok(()) => debug!(
                "Cached token {} for user {} until {}",
                fingerprint, resolved.user_id, expires_at
            ),
            Err(e) => warn!("Failed to cache token {}: {}", fingerprint, e),
        },
        None => warn!(
            "Token {} resolved with expiry {} already passed, not caching",
            fingerprint, resolved.expires_at
        ),
    }

    Ok(resolved.user_id)
}

/// `Authorization: <token>` 或 `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };
    (!token.is_empty()).then_some(token)
}

pub async fn auth_middleware(
    State(gate): State<Arc<AuthGate>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(token) = bearer_token(request.headers()) else {
        debug!("Rejected {} without token", request.uri().path());
        return Err(AuthError::MissingCredential);
    };

    let user = gate.authenticate(token).await?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
