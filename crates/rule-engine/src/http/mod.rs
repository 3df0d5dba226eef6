//! HTTP 接口
//!
//! 路径沿用历史接口：`/create_rule`、`/combine_rules`、`/evaluate_rule`、`/modify_rule`。

pub mod dto;
pub mod error;
pub mod handlers;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use rule_shared::observability::middleware::{http_tracing, request_id};
use tower_http::trace::TraceLayer;

/// 构建规则相关的路由
pub fn rule_routes() -> Router<AppState> {
    Router::new()
        .route("/create_rule", post(handlers::create_rule))
        .route("/combine_rules", post(handlers::combine_rules))
        .route("/evaluate_rule", post(handlers::evaluate_rule))
        .route("/modify_rule", post(handlers::modify_rule))
        .route("/rules/{id}", get(handlers::get_rule))
}

/// 构建完整的应用路由
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(rule_routes())
        .route("/health", get(|| async { "OK" }))
        .layer(middleware::from_fn(http_tracing))
        .layer(middleware::from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
