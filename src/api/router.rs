//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum
//! server. Routes are nested under `/api/` and protected by bearer
//! token auth; CORS sits outside auth so preflight requests pass.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the API router with all endpoints under `/api/`.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost
/// layer); endpoint handlers use `State<ApiContext>`.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    // Layers apply bottom-up: Extension outermost, then CORS, then auth.
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/medications",
            get(endpoints::medications::list).post(endpoints::medications::create),
        )
        .route(
            "/medications/:id",
            get(endpoints::medications::detail)
                .put(endpoints::medications::update)
                .delete(endpoints::medications::remove),
        )
        .route(
            "/logs",
            get(endpoints::intake_logs::list).post(endpoints::intake_logs::create),
        )
        .route(
            "/logs/:id",
            get(endpoints::intake_logs::detail)
                .put(endpoints::intake_logs::update)
                .delete(endpoints::intake_logs::remove),
        )
        .route("/notifications", get(endpoints::notifications::list))
        .route("/schedule/today", get(endpoints::schedule::today))
        .route("/adherence", get(endpoints::adherence::series))
        .route("/suggestions", post(endpoints::suggestions::suggest))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(CorsLayer::permissive())
        .layer(axum::Extension(ctx));

    Router::new().nest("/api", routes)
}
