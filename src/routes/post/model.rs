use serde::Deserialize;

use crate::database::models::NewPost;
use crate::error::AppError;
use crate::routes::check_content;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub group_id: i64,
    pub title: String,
    pub content: String,
}

impl CreatePostRequest {
    pub fn validate(self) -> Result<NewPost, AppError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::BadRequest("Post title must not be empty".into()));
        }
        check_content(&self.content)?;

        Ok(NewPost {
            group_id: self.group_id,
            title: title.to_string(),
            content: self.content,
        })
    }
}

/// `?group=1&group=2`，为空时返回全部帖子
#[derive(Debug, Default, Deserialize)]
pub struct PostsQuery {
    #[serde(default)]
    pub group: Vec<i64>,
}
