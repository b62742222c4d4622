use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::llm::summarize::{render_fallback, summarize};
use crate::models::{SearchRequest, SearchResponse};
use crate::state::AppState;

const MAX_RESULTS: usize = 10;

/// POST /api/search - Full shopping pipeline:
///   1. Interpret the query into filters (learned path or rules)
///   2. Search the catalog index with those filters
///   3. Phrase a recommendation (LLM, or a plain listing on failure)
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Query is required".to_string()));
    }
    let limit = req
        .limit
        .unwrap_or(state.config.search_limit)
        .clamp(1, MAX_RESULTS);

    run_search(&state, &query, limit).await.map(Json)
}

pub async fn run_search(
    state: &AppState,
    query: &str,
    limit: usize,
) -> Result<SearchResponse, (StatusCode, String)> {
    // ── Step 1: Interpretation ───────────────────────────
    let interpretation = state.interpreter.resolve(query).await;
    tracing::info!(
        "Interpreted {query:?} via {:?}: {:?}",
        interpretation.source,
        interpretation.filters
    );

    // ── Step 2: Catalog search ───────────────────────────
    let catalog = state.catalog.clone();
    let filters = interpretation.filters.clone();
    let q = query.to_string();
    let results = tokio::task::spawn_blocking(move || catalog.search(&filters, &q, limit))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Catalog search error: {e}"),
            )
        })?
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Catalog search error: {e}"),
            )
        })?;

    // ── Step 3: Response generation ──────────────────────
    let response = if state.config.generate_responses {
        match summarize(&state.http_client, &state.config.llm, query, &results).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Response generation failed: {e}");
                render_fallback(&results)
            }
        }
    } else {
        render_fallback(&results)
    };

    Ok(SearchResponse {
        query: query.to_string(),
        filters: interpretation.filters,
        source: interpretation.source,
        results,
        response,
    })
}
