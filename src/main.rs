//! Homegrid - Rust Implementation
//!
//! A self-hosted dashboard board with server-side drag and drop editing.

use homegrid::{api, bus, config, layout, persist, session, ui};

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "homegrid=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Starting Homegrid (Rust) v{} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("HOMEGRID_GIT_SHA")
    );

    // Load configuration
    let config = config::load_config()?;
    tracing::info!("Configuration loaded, port: {}", config.port);

    // Move a pre-rename board file into place before the gateway opens it
    config::migrate_legacy_board();

    // Create event bus
    let bus = bus::create_bus();
    tracing::info!("Event bus initialized");

    // Open the persisted board
    let data_dir = config::get_data_dir();
    let gateway: persist::SharedGateway = Arc::new(persist::FileLayoutGateway::new(data_dir));
    let store = persist::BoardStore::open(gateway).await;
    let board = store.snapshot().await;
    tracing::info!(
        "Board loaded: {} desktop / {} mobile items ({})",
        board.desktop.len(),
        board.mobile.len(),
        store.sha().await
    );

    if config.board.seed_demo && board.total_items() == 0 {
        match store.replace(layout::demo_board()).await {
            Ok(sha) => {
                tracing::info!("Seeded demo board as {}", sha);
                if let Err(e) = store.persist().await {
                    tracing::warn!("Failed to persist demo board: {:#}", e);
                }
            }
            Err(e) => tracing::warn!("Demo board rejected: {}", e),
        }
    }

    // One drag session per process; concurrent starts displace each other
    let drag = session::DragSession::new(bus.clone(), Arc::new(session::NoopViewport));

    // Build application state
    let state = api::AppState::new(store, drag, bus.clone(), config.client());

    // Build API routes
    let app = Router::new()
        // Health check
        .route("/status", get(api::status_handler))
        // Board state
        .route("/api/board", get(api::board_handler))
        .route("/api/board", post(api::board_replace_handler))
        .route("/api/board/action", post(api::board_action_handler))
        .route("/api/config", get(api::config_handler))
        // Drag session protocol
        .route("/api/session/start", post(api::session_start_handler))
        .route("/api/session/hover", post(api::session_hover_handler))
        .route("/api/session/end", post(api::session_end_handler))
        .route("/api/session/cancel", post(api::session_cancel_handler))
        .route("/api/group/drop", post(api::group_drop_handler))
        // Server-sent events
        .route("/events", get(api::events_handler))
        // Web UI
        .route("/", get(ui::board_page))
        .route("/settings", get(ui::settings_page))
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
