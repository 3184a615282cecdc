use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pms_core::{config::data_file_from_env_value, CoreConfig, PatientService};

/// Main entry point for the PMS application
///
/// Opens the record store, then serves the REST API until Ctrl-C. The store is closed after
/// in-flight requests have finished.
///
/// # Environment Variables
/// - `PMS_REST_ADDR`: REST server address (default: "0.0.0.0:8000")
/// - `PATIENT_DATA_FILE`: JSON record file (default: "patients.json")
/// - `RUST_LOG`: log filter, added to the default `pms=info` directive
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the record store cannot be opened,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pms_run=info".parse()?)
                .add_directive("pms_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("PMS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".into());
    let cfg = CoreConfig::new(data_file_from_env_value(
        std::env::var("PATIENT_DATA_FILE").ok(),
    ))?;

    let patient_service = PatientService::from_config(&cfg)?;

    tracing::info!("++ Starting PMS REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    api_rest::serve(listener, patient_service.clone(), shutdown_signal()).await?;

    tracing::info!("-- PMS REST stopped");
    patient_service.shutdown()?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
