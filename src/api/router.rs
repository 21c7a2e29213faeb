//! API router.
//!
//! Routes are nested under `/api/`; the push channel lives at `/ws/alerts`.
//! Every route passes through the request logger.

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::api::websocket;
use crate::core_state::CoreState;

/// Build the API router around shared state.
pub fn ward_api_router(core: Arc<CoreState>) -> Router {
    build_router(ApiContext::new(core))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/alerts", get(endpoints::alerts::list))
        .route("/alerts/counts", get(endpoints::alerts::counts))
        .route("/alerts/acknowledge-all", post(endpoints::alerts::acknowledge_all))
        .route("/alerts/:id/acknowledge", post(endpoints::alerts::acknowledge))
        .route(
            "/roster",
            get(endpoints::roster::current).put(endpoints::roster::replace),
        )
        .route("/roster/patients", post(endpoints::roster::upsert))
        .route("/roster/patients/:id", delete(endpoints::roster::remove))
        .with_state(ctx.clone());

    let ws_routes = Router::new()
        .route("/ws/alerts", get(websocket::ws_upgrade))
        .with_state(ctx);

    Router::new()
        .nest("/api", api)
        .merge(ws_routes)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(CorsLayer::permissive())
}
