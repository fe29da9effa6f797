use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::Response,
};
use tracing::error;

/// 5xx 响应体最多记录这么多字节
const MAX_LOGGED_BODY: usize = 4096;

/// 记录服务端错误响应，日志只截取响应体开头，响应体完整返回给客户端
pub async fn log_errors(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let response = next.run(req).await;

    if !response.status().is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            error!(
                "{} {} failed with {}, body unreadable: {}",
                method, path, parts.status, e
            );
            parts.headers.remove(CONTENT_LENGTH);
            return Response::from_parts(parts, Body::empty());
        }
    };

    let logged = &bytes[..bytes.len().min(MAX_LOGGED_BODY)];
    if logged.len() < bytes.len() {
        error!(
            "{} {} failed with {}: {}... ({} bytes)",
            method,
            path,
            parts.status,
            String::from_utf8_lossy(logged),
            bytes.len()
        );
    } else {
        error!(
            "{} {} failed with {}: {}",
            method,
            path,
            parts.status,
            String::from_utf8_lossy(logged)
        );
    }

    parts.headers.remove(CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}
