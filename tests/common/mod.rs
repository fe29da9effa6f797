//! HTTP 接口测试的公共部分
//!
//! 真实路由 + 内存存储 + 进程内令牌缓存，授权服务由 wiremock 模拟。

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use forum_backend::AppState;
use forum_backend::authority::HttpTokenAuthority;
use forum_backend::cache::MemoryTokenCache;
use forum_backend::database::models::{
    Comment, Group, GroupAdmin, GroupMember, NewComment, NewGroup, NewPost, Post,
};
use forum_backend::database::{CommentStore, GroupStore, PostStore, StoreError};
use forum_backend::middleware::AuthGate;
use forum_backend::router::create_router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_BASE: &str = "/api";

#[derive(Default)]
struct Tables {
    groups: Vec<Group>,
    members: Vec<GroupMember>,
    admins: Vec<GroupAdmin>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
}

/// 基于 Vec 的内存存储，各表ID从 1 开始
#[derive(Default)]
pub struct MemoryRecordStore {
    tables: Mutex<Tables>,
}

impl MemoryRecordStore {
    pub fn members(&self) -> Vec<GroupMember> {
        self.tables.lock().unwrap().members.clone()
    }

    pub fn admins(&self) -> Vec<GroupAdmin> {
        self.tables.lock().unwrap().admins.clone()
    }

    pub fn post_count(&self) -> usize {
        self.tables.lock().unwrap().posts.len()
    }

    pub fn comment_count(&self) -> usize {
        self.tables.lock().unwrap().comments.len()
    }
}

#[async_trait]
impl GroupStore for MemoryRecordStore {
    async fn add_group(&self, group: NewGroup, owner: i64) -> Result<Group, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let group = Group {
            id: tables.groups.len() as i64 + 1,
            name: group.name,
            private: group.private,
            created_at: now,
            updated_at: now,
        };
        tables.groups.push(group.clone());
        tables.members.push(GroupMember {
            group_id: group.id,
            user_id: owner,
        });
        tables.admins.push(GroupAdmin {
            group_id: group.id,
            user_id: owner,
        });
        Ok(group)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        Ok(self.tables.lock().unwrap().groups.clone())
    }

    async fn get_group(&self, id: i64) -> Result<Option<Group>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn add_group_member(&self, group_id: i64, user_id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let member = GroupMember { group_id, user_id };
        if !tables.members.contains(&member) {
            tables.members.push(member);
        }
        Ok(())
    }

    async fn add_group_admin(&self, group_id: i64, user_id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let admin = GroupAdmin { group_id, user_id };
        if !tables.admins.contains(&admin) {
            tables.admins.push(admin);
        }
        Ok(())
    }
}

#[async_trait]
impl PostStore for MemoryRecordStore {
    async fn add_post(&self, post: NewPost, owner: i64) -> Result<Post, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let post = Post {
            id: tables.posts.len() as i64 + 1,
            group_id: post.group_id,
            user_id: owner,
            title: post.title,
            content: post.content,
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn list_posts(&self, group_ids: &[i64]) -> Result<Vec<Post>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .posts
            .iter()
            .filter(|p| group_ids.is_empty() || group_ids.contains(&p.group_id))
            .cloned()
            .collect())
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }
}

#[async_trait]
impl CommentStore for MemoryRecordStore {
    async fn add_comment(&self, comment: NewComment, owner: i64) -> Result<Comment, StoreError> {
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        let comment = Comment {
            id: tables.comments.len() as i64 + 1,
            post_id: comment.post_id,
            user_id: owner,
            content: comment.content,
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, post_ids: &[i64]) -> Result<Vec<Comment>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .comments
            .iter()
            .filter(|c| post_ids.is_empty() || post_ids.contains(&c.post_id))
            .cloned()
            .collect())
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, StoreError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryRecordStore>,
    pub cache: Arc<MemoryTokenCache>,
    pub authority: MockServer,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let authority = MockServer::start().await;
        let client = HttpTokenAuthority::new(
            &format!("{}/tokens", authority.uri()),
            Duration::from_secs(2),
        )
        .expect("authority url");

        let store = Arc::new(MemoryRecordStore::default());
        let cache = Arc::new(MemoryTokenCache::new());
        let gate = Arc::new(AuthGate::new(cache.clone(), Arc::new(client)));

        let state = AppState {
            store: store.clone(),
            gate,
        };

        Self {
            router: create_router(state, API_BASE),
            store,
            cache,
            authority,
        }
    }

    /// 让授权服务接受 `token`，对应 `user_id`，有效期一小时
    pub async fn grant(&self, token: &str, user_id: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/tokens/{token}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": token,
                "user_id": user_id,
                "expires_at": Utc::now().timestamp() + 3600,
            })))
            .mount(&self.authority)
            .await;
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::POST, uri, Some(token), Some(body.to_string())))
            .await
    }
}

pub fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<String>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}
