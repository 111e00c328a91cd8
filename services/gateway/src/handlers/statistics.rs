use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use types::statistics::Statistics;

/// `GET /api/statistics`
pub async fn get_statistics(State(state): State<AppState>) -> Json<Statistics> {
    Json(state.aggregator.statistics())
}

/// `GET /api/statistics/{instrument}`
pub async fn get_instrument_statistics(
    State(state): State<AppState>,
    Path(instrument): Path<String>,
) -> Result<Json<Statistics>, AppError> {
    state
        .aggregator
        .instrument_statistics(&instrument)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No statistics for instrument {}", instrument)))
}
