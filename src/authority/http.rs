use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::{AuthorityError, ResolvedToken, TokenAuthority};

#[derive(Debug, Clone)]
pub struct HttpTokenAuthority {
    client: Client,
    base_url: Url,
}

impl HttpTokenAuthority {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AuthorityError> {
        let base_url =
            Url::parse(base_url).map_err(|e| AuthorityError::InvalidBaseUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(AuthorityError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(AuthorityError::Transport)?;

        Ok(Self { client, base_url })
    }

    /// 令牌作为单独的路径段追加，特殊字符会被转义
    fn token_url(&self, token: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(token);
        }
        url
    }
}

#[async_trait]
impl TokenAuthority for HttpTokenAuthority {
    async fn resolve(&self, token: &str) -> Result<ResolvedToken, AuthorityError> {
        // 错误信息去掉 URL，URL 中含令牌
        let response = self
            .client
            .get(self.token_url(token))
            .send()
            .await
            .map_err(|e| AuthorityError::Transport(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthorityError::Rejected(status.as_u16()));
        }

        let payload = response
            .bytes()
            .await
            .map_err(|e| AuthorityError::Transport(e.without_url()))?;
        let resolved: ResolvedToken =
            serde_json::from_slice(&payload).map_err(AuthorityError::Decode)?;

        if resolved.token != token {
            return Err(AuthorityError::TokenMismatch);
        }

        Ok(resolved)
    }
}
