//! Metrics collection and Prometheus export.
//!
//! Installs the global recorder and renders it for `/metrics`. Registry
//! counters are recorded through the helpers below so label values stay fixed.

use crate::models::UpsertOutcome;
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Must run once, before any metric is recorded.
pub fn init_metrics() -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("failed to install Prometheus recorder: {}", e))?;

    METRICS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("metrics recorder already initialized"))
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

pub fn record_upsert(outcome: UpsertOutcome) {
    counter!("assistant_upserts_total", "operation" => outcome.as_str()).increment(1);
}

pub fn record_delete() {
    counter!("assistant_deletes_total").increment(1);
}

/// `outcome` is `delivered` or `unknown_assistant`.
pub fn record_message(outcome: &'static str) {
    counter!("assistant_messages_total", "outcome" => outcome).increment(1);
}
