use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use travel_rag::core::config::{AppPaths, ConfigService};
use travel_rag::core::logging::{self, LogTarget};
use travel_rag::server;
use travel_rag::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths, LogTarget::Server);

    let config_service = ConfigService::new(paths.clone());
    let state = match AppState::initialize(&config_service).await {
        Ok(state) => state,
        Err(err) => {
            tracing::error!("Startup failed: {}", err);
            return Err(err).context("Failed to initialize the query service");
        }
    };

    let bind_addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
