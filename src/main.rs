use axum::routing::{get, post};
use axum::Router;
use tracing_subscriber::EnvFilter;

use shop_assist::api;
use shop_assist::config::Config;
use shop_assist::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Catalog: {}", config.catalog_path.display());
    tracing::info!(
        "Learned path: {} ({} / {})",
        if config.interpreter.use_learned_path { "enabled" } else { "disabled" },
        config.llm.provider,
        config.llm.base_url
    );

    let state = AppState::new(config.clone())?;

    let app = Router::new()
        .route("/api/interpret", post(api::interpret::interpret))
        .route("/api/search", post(api::search::search))
        .route("/api/config", get(api::config::get_config))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
