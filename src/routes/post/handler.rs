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

use super::model::{CreatePostRequest, PostsQuery};
use crate::AppState;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::routes::{json_rejected, owner_id, path_rejected, query_rejected};
use crate::utils::success_to_api_response;

#[axum::debug_handler]
pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload.map_err(|e| json_rejected("post", e))?;
    let post = req.validate()?;
    let owner = owner_id(&user)?;

    if state.store.get_group(post.group_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Group {} not found",
            post.group_id
        )));
    }

    let post = state.store.add_post(post, owner).await?;
    tracing::info!(post_id = post.id, group_id = post.group_id, owner, "Post created");

    Ok((StatusCode::CREATED, success_to_api_response(post)))
}

#[axum::debug_handler]
pub async fn list_posts(
    State(state): State<AppState>,
    query: Result<Query<PostsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query.map_err(query_rejected)?;
    let posts = state.store.list_posts(&query.group).await?;
    Ok(success_to_api_response(posts))
}

#[axum::debug_handler]
pub async fn get_post(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id.map_err(path_rejected)?;

    match state.store.get_post(id).await? {
        Some(post) => Ok(success_to_api_response(post)),
        None => Err(AppError::NotFound(format!("Post {id} not found"))),
    }
}
