use catalog_basket::config::Settings;
use catalog_basket::router::create_app_router;
use catalog_basket::state::AppState;
use catalog_basket::store::Store;
use std::sync::Arc;
use tracing::info;

fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .compact()
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let settings = Settings::load()?;

    // Creates the tables (and the snapshot file, if configured) before serving
    let store = Store::open(settings.data_file.clone()).await?;
    let state = Arc::new(AppState::new(store, settings));

    let app = create_app_router(state.clone());

    let addr = state.settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, app = %state.settings.app_name, "server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
