use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::models::{InterpretRequest, InterpretResponse};
use crate::state::AppState;

/// POST /api/interpret - Structured filters for a free-text query.
pub async fn interpret(
    State(state): State<AppState>,
    Json(req): Json<InterpretRequest>,
) -> Result<Json<InterpretResponse>, (StatusCode, String)> {
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Query is required".to_string()));
    }

    let interpretation = state.interpreter.resolve(&query).await;

    Ok(Json(InterpretResponse {
        query,
        filters: interpretation.filters,
        source: interpretation.source,
    }))
}
