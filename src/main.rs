use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ev_rental_ops::{
    config::Config,
    db::{seed, EntityStore},
    error::{AppError, AppResult},
    middleware::rate_limit::{create_global_governor, log_request},
    routes,
    services::{RentalService, SystemClock},
    AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ev_rental_ops=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Server stopped");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Starting server at {}", config.server_addr());

    let store = if config.seed_demo_data {
        tracing::info!("Seeding demo fleet");
        seed::demo_store()
    } else {
        EntityStore::new()
    };
    let rental = RentalService::new(store, Arc::new(SystemClock), config.critical_overdue_days);
    let state = AppState::new(rental, config.clone());

    // Per-IP rate limiting for the whole API
    let governor = create_global_governor(&config)?;

    let app = routes::create_router(state)
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(governor);

    // Start server with socket address for rate limiting
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| AppError::Internal(format!("Invalid address {}: {}", config.server_addr(), e)))?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| AppError::Internal(format!("Server error: {}", e)))
}
