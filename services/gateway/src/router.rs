use crate::handlers::{metrics, statistics, ticks};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/ticks", post(ticks::post_tick))
        .route("/statistics", get(statistics::get_statistics))
        .route(
            "/statistics/{instrument}",
            get(statistics::get_instrument_statistics),
        )
        .route("/metrics", get(metrics::get_metrics));

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
