use devcamper::{app, AppConfig, AppState, Store};
use devcamper_core::{init_tracing, DevConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = DevConfig::load("dev")?.with_typed::<AppConfig>()?;
    let settings = config.typed().clone();
    let store = Store::connect(&settings).await?;
    let addr = format!("{}:{}", settings.host, settings.port);
    let profile = config.profile().to_string();

    let router = app(AppState::new(settings, store));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, %profile, "server running");

    devcamper_core::axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
