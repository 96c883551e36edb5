//! # Grove API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use grove_core::ports::KeyValueStore;
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Must run before telemetry so LOG_* variables from the file apply.
    let env_file = config::load_env_file();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    match env_file {
        Ok(Some(path)) => tracing::info!(path = %path, "Loaded environment file"),
        Ok(None) => tracing::debug!("No environment file found"),
        Err(e) => tracing::warn!(error = %e, "Ignoring environment file"),
    }

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Grove API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await?;
    let kvs = state.kvs.clone();

    let data = web::Data::new(state);
    close_after(kvs, serve(&config, data)).await?;
    tracing::info!("Server stopped");
    Ok(())
}

/// Run the HTTP server until it shuts down.
async fn serve(config: &AppConfig, data: web::Data<AppState>) -> std::io::Result<()> {
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(data.clone())
            .configure(handlers::configure_routes)
    })
    .shutdown_timeout(config.shutdown_timeout.as_secs())
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

/// Await `server`, then release the cache client whether or not it failed.
async fn close_after<F>(kvs: Option<Arc<dyn KeyValueStore>>, server: F) -> std::io::Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    let result = server.await;
    if let Some(kvs) = kvs {
        kvs.close().await;
    }
    result
}
