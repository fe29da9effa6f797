pub mod comment;
pub mod group;
pub mod post;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    response::IntoResponse,
};
use axum_extra::extract::QueryRejection;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::utils::success_to_api_response;

/// 帖子与评论内容的最大字符数
pub const MAX_CONTENT_CHARS: usize = 500;

pub async fn ping() -> impl IntoResponse {
    success_to_api_response("pong")
}

/// 认证得到的用户 ID 转换为存储层使用的 BIGINT
pub(crate) fn owner_id(user: &AuthUser) -> Result<i64, AppError> {
    i64::try_from(user.user_id)
        .map_err(|_| AppError::BadRequest(format!("User id {} is out of range", user.user_id)))
}

pub(crate) fn json_rejected(what: &str, rejection: JsonRejection) -> AppError {
    AppError::BadRequest(format!("Failed to parse {what}: {}", rejection.body_text()))
}

pub(crate) fn path_rejected(rejection: PathRejection) -> AppError {
    AppError::BadRequest(rejection.body_text())
}

pub(crate) fn query_rejected(rejection: QueryRejection) -> AppError {
    AppError::BadRequest(rejection.body_text())
}

pub(crate) fn check_content(content: &str) -> Result<(), AppError> {
    let chars = content.chars().count();
    if chars > MAX_CONTENT_CHARS {
        return Err(AppError::BadRequest(format!(
            "Content is {chars} characters, the limit is {MAX_CONTENT_CHARS}"
        )));
    }
    Ok(())
}
