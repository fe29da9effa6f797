use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::database::StoreError;
use crate::utils::{error_codes, error_to_api_response};

/// 路由层错误，认证失败由 `AuthError` 单独处理
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, msg) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND, msg),
            // 存储错误细节只写日志，不返回给客户端
            AppError::Store(e) => {
                tracing::error!("Store operation failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::INTERNAL_ERROR,
                    "内部服务器错误".to_string(),
                )
            }
        };

        (status, error_to_api_response::<()>(code, msg)).into_response()
    }
}
