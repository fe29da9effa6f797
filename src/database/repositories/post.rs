use async_trait::async_trait;

use super::PgRecordStore;
use crate::database::models::{NewPost, Post};
use crate::database::{PostStore, StoreError};

const POST_COLUMNS: &str = "id, group_id, user_id, title, content, created_at, updated_at";

#[async_trait]
impl PostStore for PgRecordStore {
    async fn add_post(&self, post: NewPost, owner: i64) -> Result<Post, StoreError> {
        let created = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (group_id, user_id, title, content)
            VALUES ($1, $2, $3, $4)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post.group_id)
        .bind(owner)
        .bind(&post.title)
        .bind(&post.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list_posts(&self, group_ids: &[i64]) -> Result<Vec<Post>, StoreError> {
        let posts = if group_ids.is_empty() {
            sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts ORDER BY id"))
                .fetch_all(&self.pool)
                .await?
        } else {
            sqlx::query_as::<_, Post>(&format!(
                "SELECT {POST_COLUMNS} FROM posts WHERE group_id = ANY($1) ORDER BY id"
            ))
            .bind(group_ids.to_vec())
            .fetch_all(&self.pool)
            .await?
        };

        Ok(posts)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }
}
