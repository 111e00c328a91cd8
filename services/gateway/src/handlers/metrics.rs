use crate::state::AppState;
use axum::{extract::State, Json};
use std::collections::BTreeMap;

/// `GET /api/metrics`
pub async fn get_metrics(State(state): State<AppState>) -> Json<BTreeMap<String, u64>> {
    Json(state.aggregator.metrics().export())
}
