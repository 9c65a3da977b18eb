//! forecast-serve - LSTM forecasting over HTTP
//!
//! Loads the model, then serves `POST /predict` until Ctrl+C.
//! A model that fails to load stops the process before it binds.

use clap::Parser;
use forecast_serve::{create_router, AppState, LstmPredictor, ServeConfig};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::fmt;

#[tokio::main]
async fn main() -> forecast_serve::Result<()> {
    let config = ServeConfig::parse();

    fmt()
        .with_env_filter(config.log_filter())
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let addr = config.socket_addr()?;
    let predictor = LstmPredictor::load(config.predictor_config())?;

    let app = create_router(AppState::new(predictor));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "Forecast server listening; POST /predict");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Forecast server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down...");
}
