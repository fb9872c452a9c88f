use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, debug, trace, error};

use crate::config::{initialize_app_state, Settings};
use crate::router::create_router;

pub async fn serve(settings: Settings) -> Result<()> {
    trace!("Entering serve function");
    info!("DineFund application starting up");
    debug!("Database URL: {}", settings.database_url);
    debug!("Bind address: {}", settings.bind_address);

    // Initialize application state
    trace!("Initializing application state");
    let state = match initialize_app_state(&settings).await {
        Ok(state) => {
            debug!("Application state initialized successfully");
            state
        }
        Err(e) => {
            error!("Failed to initialize application state: {}", e);
            return Err(e);
        }
    };

    let app = create_router(state);
    debug!("Router created successfully");

    run_server(app, &settings.bind_address).await
}

/// Binds the listener and serves `app` until shutdown.
pub(crate) async fn run_server(app: axum::Router, bind_address: &str) -> Result<()> {
    info!("Starting server on {}", bind_address);
    let listener = match TcpListener::bind(bind_address).await {
        Ok(listener) => {
            debug!("Successfully bound to address: {}", bind_address);
            listener
        }
        Err(e) => {
            error!("Failed to bind to address {}: {}", bind_address, e);
            return Err(e.into());
        }
    };

    info!("DineFund API server running on http://{}", bind_address);
    info!("Swagger UI available at http://{}/swagger-ui", bind_address);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Server shutdown gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
