use async_trait::async_trait;

use super::PgRecordStore;
use crate::database::models::{Comment, NewComment};
use crate::database::{CommentStore, StoreError};

const COMMENT_COLUMNS: &str = "id, post_id, user_id, content, created_at, updated_at";

#[async_trait]
impl CommentStore for PgRecordStore {
    async fn add_comment(&self, comment: NewComment, owner: i64) -> Result<Comment, StoreError> {
        let created = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (post_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(comment.post_id)
        .bind(owner)
        .bind(&comment.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list_comments(&self, post_ids: &[i64]) -> Result<Vec<Comment>, StoreError> {
        let comments = if post_ids.is_empty() {
            sqlx::query_as::<_, Comment>(&format!(
                "SELECT {COMMENT_COLUMNS} FROM comments ORDER BY id"
            ))
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Comment>(&format!(
                "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = ANY($1) ORDER BY id"
            ))
            .bind(post_ids.to_vec())
            .fetch_all(&self.pool)
            .await?
        };

        Ok(comments)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, StoreError> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }
}
