use axum::{
    Extension,
    extract::{
        Json, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::{Query, QueryRejection};

use super::model::{CommentsQuery, CreateCommentRequest};
use crate::AppState;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::routes::{json_rejected, owner_id, path_rejected, query_rejected};
use crate::utils::success_to_api_response;

#[axum::debug_handler]
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload.map_err(|e| json_rejected("comment", e))?;
    let comment = req.validate()?;
    let owner = owner_id(&user)?;

    if state.store.get_post(comment.post_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Post {} not found",
            comment.post_id
        )));
    }

    let comment = state.store.add_comment(comment, owner).await?;
    tracing::debug!(comment_id = comment.id, post_id = comment.post_id, "Comment created");

    Ok((StatusCode::CREATED, success_to_api_response(comment)))
}

#[axum::debug_handler]
pub async fn list_comments(
    State(state): State<AppState>,
    query: Result<Query<CommentsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query.map_err(query_rejected)?;
    let comments = state.store.list_comments(&query.post).await?;
    Ok(success_to_api_response(comments))
}

#[axum::debug_handler]
pub async fn get_comment(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id.map_err(path_rejected)?;

    match state.store.get_comment(id).await? {
        Some(comment) => Ok(success_to_api_response(comment)),
        None => Err(AppError::NotFound(format!("Comment {id} not found"))),
    }
}
