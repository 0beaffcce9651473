//! Fatigue Monitor - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, Settings};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    init_logging(&settings.logging)?;

    info!("=== Fatigue Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus recorder unavailable: {}", e);
            None
        }
    };

    run_server(settings, metrics).await
}
