use axum::{
    Extension,
    extract::{
        Json, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};

use super::model::CreateGroupRequest;
use crate::AppState;
use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::routes::{json_rejected, owner_id, path_rejected};
use crate::utils::success_to_api_response;

#[axum::debug_handler]
pub async fn create_group(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateGroupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload.map_err(|e| json_rejected("group", e))?;
    let group = req.validate()?;
    let owner = owner_id(&user)?;

    let group = state.store.add_group(group, owner).await?;
    tracing::info!(group_id = group.id, owner, "Group created");

    Ok((StatusCode::CREATED, success_to_api_response(group)))
}

#[axum::debug_handler]
pub async fn list_groups(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let groups = state.store.list_groups().await?;
    Ok(success_to_api_response(groups))
}

#[axum::debug_handler]
pub async fn get_group(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id.map_err(path_rejected)?;

    match state.store.get_group(id).await? {
        Some(group) => Ok(success_to_api_response(group)),
        None => Err(AppError::NotFound(format!("Group {id} not found"))),
    }
}
