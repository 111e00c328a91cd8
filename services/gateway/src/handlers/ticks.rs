use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use types::tick::TickRequest;

/// `POST /api/ticks`
///
/// 204 when the tick is accepted. A tick older than the statistics window
/// gets 200 with a JSON content type and no body.
pub async fn post_tick(
    State(state): State<AppState>,
    payload: Result<Json<TickRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let tick = request.validate()?;

    if state.aggregator.add_tick(tick) {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
        )
            .into_response())
    }
}
