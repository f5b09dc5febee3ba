// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::errors::NodeError;

/// Initialize telemetry (logs + metrics).
///
/// Must run inside the tokio runtime when `metrics_addr` is set, the
/// exporter spawns its HTTP listener there.
pub fn init_telemetry(metrics_addr: Option<SocketAddr>) -> Result<(), NodeError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "mmc_node=debug,mmc_kernel=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| NodeError::Telemetry(e.to_string()))?;

    if let Some(addr) = metrics_addr {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .map_err(|e| NodeError::Telemetry(e.to_string()))?;
        tracing::info!("Prometheus metrics on http://{}/metrics", addr);
    }

    metrics::describe_counter!("lass_transactions_total", "LASS transactions answered");
    metrics::describe_counter!("lass_transactions_dropped_total", "LASS transactions dropped as malformed");
    metrics::describe_counter!("eeprom_writes_total", "Record store writes from the EEPROM page");
    metrics::gauge!("mmc_node_up", 1.0);
    Ok(())
}
