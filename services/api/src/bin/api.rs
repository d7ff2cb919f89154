//! services/api/src/bin/api.rs

use api_lib::{
    config::{Config, ConfigError},
    error::ApiError,
    web::{
        close_chat_handler, get_chat_handler, list_locales_handler, open_chat_handler,
        playback_ws_handler, require_visitor, rest::ApiDoc, send_message_handler,
        set_locale_handler, state::AppState,
    },
};
use axum::http::{
    header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE},
    HeaderValue, Method,
};
use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Prepare Storage ---
    for scope in ["sessions", "visitors"] {
        tokio::fs::create_dir_all(config.storage_dir.join(scope)).await?;
    }
    info!("Storage ready at {}", config.storage_dir.display());
    if !config.narration_path.exists() {
        warn!(
            "Narration file {} not found; playback sockets will report an error.",
            config.narration_path.display()
        );
    }

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone()));
    let shutdown = CancellationToken::new();
    let sweeper = tokio::spawn(app_state.clone().run_session_sweeper(shutdown.clone()));
    info!(
        "Idle chat sessions expire after {}s.",
        config.session_idle_timeout.as_secs()
    );

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ConfigError::InvalidValue("CORS_ORIGIN".to_string(), e.to_string())
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT, ACCEPT_LANGUAGE]);

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/locales", get(list_locales_handler))
        .route("/locale", put(set_locale_handler))
        .route("/chat", get(get_chat_handler))
        .route("/chat/open", post(open_chat_handler))
        .route("/chat/close", post(close_chat_handler))
        .route("/chat/messages", post(send_message_handler))
        .route("/playback", get(playback_ws_handler))
        .layer(axum_middleware::from_fn(require_visitor))
        .layer(cors)
        .with_state(app_state.clone());

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for the shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    // --- 6. Shut Down ---
    info!("Shutting down; writing live sessions.");
    shutdown.cancel();
    if let Err(e) = sweeper.await {
        warn!("Session sweeper panicked: {:?}", e);
    }
    app_state.flush_sessions().await;

    Ok(())
}
