use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::middleware::{auth_middleware, log_errors};
use crate::routes;

/// 组装全部路由，`/ping` 之外的接口都挂在 `api_base_uri` 下并经过认证
pub fn create_router(state: AppState, api_base_uri: &str) -> Router {
    let protected_routes = Router::new()
        // 群组路由
        .route(
            "/groups",
            get(routes::group::list_groups).post(routes::group::create_group),
        )
        .route("/groups/{id}", get(routes::group::get_group))
        // 帖子路由
        .route(
            "/posts",
            get(routes::post::list_posts).post(routes::post::create_post),
        )
        .route("/posts/{id}", get(routes::post::get_post))
        // 评论路由
        .route(
            "/comments",
            get(routes::comment::list_comments).post(routes::comment::create_comment),
        )
        .route("/comments/{id}", get(routes::comment::get_comment))
        // 应用认证中间件
        .route_layer(from_fn_with_state(state.gate.clone(), auth_middleware));

    let base = api_base_uri.trim_end_matches('/');
    let router = Router::new().route("/ping", get(routes::ping));
    let router = if base.is_empty() {
        router.merge(protected_routes)
    } else {
        router.nest(base, protected_routes)
    };

    router
        .layer(from_fn(log_errors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
