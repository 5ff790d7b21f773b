//! DoubtSolver connectivity check binary.
//!
//! Loads configuration, wires the service over the REST backend, and probes
//! the one document the app reads before any sign-in: the category registry.

use std::sync::Arc;

use doubt_solver::adapters::memory::MemoryPendingSignups;
use doubt_solver::adapters::rest::RestBackend;
use doubt_solver::application::DoubtSolver;
use doubt_solver::config::AppConfig;
use doubt_solver::domain::category::CategoryRegistry;
use doubt_solver::ports::DocumentStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    if config.is_production() {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        environment = ?config.environment,
        backend = %config.backend.base_url,
        project = %config.backend.project_id,
        "Starting DoubtSolver data layer"
    );

    let backend = Arc::new(RestBackend::new(config.backend.rest_config()));
    let solver = DoubtSolver::new(
        backend.clone(),
        backend.clone(),
        Arc::new(MemoryPendingSignups::new()),
        config.campus.policy(),
    );
    tracing::info!(signed_in = solver.current_session().is_some(), "Service assembled");

    match backend.get("meta", "categories").await {
        Ok(Some(document)) => {
            let registry: CategoryRegistry = serde_json::from_value(document)?;
            tracing::info!("Backend reachable; {} categories registered", registry.len());
        }
        Ok(None) => {
            tracing::info!("Backend reachable; no categories registered yet");
        }
        Err(e) => {
            tracing::error!("Backend probe failed: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
