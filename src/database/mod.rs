// 数据库模块
// 群组、帖子、评论的存储接口及 Postgres 实现

pub mod models;
pub mod repositories;

use async_trait::async_trait;
use thiserror::Error;

use models::{Comment, Group, NewComment, NewGroup, NewPost, Post};

pub use repositories::PgRecordStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait GroupStore: Send + Sync {
    /// 创建群组，并把 `owner` 同时设为成员和管理员
    async fn add_group(&self, group: NewGroup, owner: i64) -> Result<Group, StoreError>;
    async fn list_groups(&self) -> Result<Vec<Group>, StoreError>;
    async fn get_group(&self, id: i64) -> Result<Option<Group>, StoreError>;
    async fn add_group_member(&self, group_id: i64, user_id: i64) -> Result<(), StoreError>;
    async fn add_group_admin(&self, group_id: i64, user_id: i64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn add_post(&self, post: NewPost, owner: i64) -> Result<Post, StoreError>;
    /// `group_ids` 为空时返回全部帖子
    async fn list_posts(&self, group_ids: &[i64]) -> Result<Vec<Post>, StoreError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, StoreError>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn add_comment(&self, comment: NewComment, owner: i64) -> Result<Comment, StoreError>;
    /// `post_ids` 为空时返回全部评论
    async fn list_comments(&self, post_ids: &[i64]) -> Result<Vec<Comment>, StoreError>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, StoreError>;
}

/// 路由层使用的完整存储接口
pub trait RecordStore: GroupStore + PostStore + CommentStore {}

impl<T: GroupStore + PostStore + CommentStore> RecordStore for T {}
