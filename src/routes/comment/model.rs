use serde::Deserialize;

use crate::database::models::NewComment;
use crate::error::AppError;
use crate::routes::check_content;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub post_id: i64,
    pub content: String,
}

impl CreateCommentRequest {
    pub fn validate(self) -> Result<NewComment, AppError> {
        if self.content.trim().is_empty() {
            return Err(AppError::BadRequest("Comment must not be empty".into()));
        }
        check_content(&self.content)?;

        Ok(NewComment {
            post_id: self.post_id,
            content: self.content,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentsQuery {
    #[serde(default)]
    pub post: Vec<i64>,
}
