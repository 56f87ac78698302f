//! 路由装配

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::state::AppState;
use super::{coding, health, init, orchestrator, relations};

/// 期初导入按整表提交，放宽请求体上限
const BODY_LIMIT_BYTES: usize = 16 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics))
        .route("/api/orchestrator/push", post(orchestrator::push))
        .route("/api/orchestrator/pull", post(orchestrator::pull))
        .route("/api/init/inventory", post(init::load_inventory))
        .route("/api/init/wip", post(init::load_wip))
        .route(
            "/api/init/receivables-payables",
            post(init::load_finance),
        )
        .route(
            "/api/code-rules",
            get(coding::list_rules).post(coding::create_rule),
        )
        .route("/api/code-rules/preview", post(coding::preview))
        .route("/api/code-rules/allocate", post(coding::allocate))
        .route(
            "/api/code-rules/{id}",
            get(coding::get_rule)
                .put(coding::update_rule)
                .delete(coding::delete_rule),
        )
        .route(
            "/api/relations/demand/{demand_id}/targets",
            get(relations::demand_trace),
        )
        .route("/api/relations/{kind}/{id}", get(relations::document_relations))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
