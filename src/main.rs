// region:    --- Imports
use axum::{
    routing::{get, post},
    Router,
};
use repo_auction_service::database::DatabaseManager;
use repo_auction_service::handlers;
use repo_auction_service::scheduler::StatusScheduler;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let db_manager = Arc::new(DatabaseManager::new().await);

    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> database initialization failed: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> database initialized", "Main");

    // Persists live -> ended once end_time passes.
    let scheduler = StatusScheduler::new(db_manager.get_pool());
    scheduler.start().await;

    // Admin dashboard origin handling.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes_all = Router::new()
        .route(
            "/admin/listings/:id/transition",
            post(handlers::handle_transition),
        )
        .route("/admin/listings/stats", get(handlers::handle_listing_stats))
        .route(
            "/admin/notifications/:user_id",
            get(handlers::handle_get_notifications),
        )
        .route(
            "/admin/notifications/:id/read",
            post(handlers::handle_mark_notification_read),
        )
        .route("/listings", get(handlers::handle_list_listings))
        .route("/listings/:id", get(handlers::handle_get_listing))
        .layer(cors)
        .with_state(db_manager);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
