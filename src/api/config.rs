use axum::extract::State;
use axum::Json;

use crate::models::ConfigResponse;
use crate::state::AppState;

/// GET /api/config
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let config = &state.config;
    Json(ConfigResponse {
        use_learned_path: state.interpreter.uses_learned_path(),
        provider: config.llm.provider.clone(),
        base_url: config.llm.base_url.clone(),
        chat_model: config.llm.chat_model.clone(),
        has_api_key: config.llm.api_key.is_some(),
        search_limit: config.search_limit,
    })
}
