//! # incubatord: incubator controller daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`incubator.toml`, env vars)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Open the serial port once, falling back to simulated readings
//! - Spawn ingestion and telemetry tasks
//! - Construct the incubator service over the serial command link
//! - Build the axum router and serve it
//! - Stop automatic control and background tasks on Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no control logic belongs here.

mod config;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use incubator_adapter_http_axum::state::AppState;
use incubator_adapter_serial::SerialPortLink;
use incubator_adapter_simulated::SimulatedSource;
use incubator_adapter_storage_sqlite_sqlx::{
    Config as DatabaseConfig, SqliteProfileRepository, SqliteTelemetrySink,
};
use incubator_app::actuator_driver::ActuatorDriver;
use incubator_app::ingestion::{SensorIngestion, select_source};
use incubator_app::reading_store::LatestReadingStore;
use incubator_app::services::IncubatorService;
use incubator_app::telemetry_recorder::TelemetryRecorder;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Database
    let db = DatabaseConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    let profiles = SqliteProfileRepository::new(pool.clone());
    for profile in &config.profiles {
        profiles.upsert(profile.to_profile()).await?;
        tracing::info!(species = %profile.species, "profile setpoints overridden from config");
    }

    // Background tasks
    let store = LatestReadingStore::new();
    let cancel = CancellationToken::new();

    // One open port feeds both sensing and actuation.
    let (primary, link) = match incubator_adapter_serial::open(&config.serial) {
        Ok((source, link)) => (Ok(source), link),
        Err(err) => (
            Err(err.into_domain()),
            SerialPortLink::disconnected(config.serial.port.clone()),
        ),
    };
    let source = select_source(
        primary,
        || SimulatedSource::new(config.simulation.clone()),
        config.control.fallback,
    )?;
    if source.is_fallback() {
        tracing::info!("serving simulated sensor readings");
    }
    let ingestion = SensorIngestion::new(source, store.clone()).spawn(cancel.child_token());
    let recorder = TelemetryRecorder::new(
        SqliteTelemetrySink::new(pool),
        store.clone(),
        config.control.telemetry_interval(),
    )
    .spawn(cancel.child_token());

    // Services
    let driver = Arc::new(ActuatorDriver::new(link));
    let service = Arc::new(IncubatorService::new(
        store,
        driver,
        profiles,
        config.control.supervisor_settings(),
    ));
    if let Some(species) = config.control.species
        && let Err(err) = service.set_profile(species).await
    {
        tracing::warn!(%species, error = %err, "initial profile not applied");
    }

    // HTTP
    let app = incubator_adapter_http_axum::router::build(AppState::from_arc(Arc::clone(&service)));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "incubatord listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Shutdown
    if let Err(err) = service.shutdown().await {
        tracing::warn!(error = %err, "control loop did not stop cleanly");
    }
    cancel.cancel();
    for (name, task) in [("ingestion", ingestion), ("telemetry", recorder)] {
        if let Err(err) = task.await {
            tracing::warn!(task = name, error = %err, "background task failed");
        }
    }
    tracing::info!("incubatord stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
