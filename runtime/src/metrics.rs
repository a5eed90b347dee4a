//! Prometheus metrics for observability and monitoring.
//!
//! The store and the console record metrics through the `metrics` facade.
//! Nothing is collected until a recorder is installed; [`MetricsServer`]
//! installs the Prometheus recorder and renders the text exposition format.
//!
//! # Example
//!
//! ```rust,no_run
//! use tp_admin_runtime::metrics::MetricsServer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new();
//! server.start()?;
//!
//! // ... run the console ...
//!
//! if let Some(text) = server.render() {
//!     eprintln!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use ::metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use ::metrics::{counter, gauge, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus metrics recorder.
///
/// Installs a process-wide recorder; render the collected metrics with
/// [`MetricsServer::render`].
#[derive(Default)]
pub struct MetricsServer {
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a new, not yet started, metrics server.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Register metric descriptions and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed. A recorder
    /// that is already installed (e.g. by another test) is not an error.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::debug!("Prometheus recorder installed");
                Ok(())
            },
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            },
        }
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if the server hasn't been started.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    // Store
    describe_counter!("store.commands.total", "Total number of actions sent to stores");
    describe_counter!("store.effects.executed", "Effects executed, labelled by effect type");
    describe_counter!("store.effects.cancelled", "In-flight effects aborted by cancellation");
    describe_histogram!("store.reducer.duration_seconds", "Time taken to run a reducer");
    describe_counter!("store.shutdown.initiated", "Graceful shutdowns started");
    describe_counter!("store.shutdown.timeout", "Graceful shutdowns that timed out");
    describe_counter!("store.shutdown.rejected_actions", "Actions rejected during shutdown");

    // Orders console
    describe_counter!("orders.fetch.started", "Order fetches issued");
    describe_counter!("orders.fetch.failed", "Order fetches that failed or timed out");
    describe_counter!("orders.fetch.stale_discarded", "Fetch results discarded as superseded");
    describe_counter!("orders.status_update.submitted", "Status updates submitted");
    describe_counter!("orders.status_update.failed", "Status updates that failed");
    describe_counter!("products.submitted", "Product submissions sent");
    describe_histogram!("api.request.duration_seconds", "HTTP request latency by endpoint");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_before_start_is_none() {
        let server = MetricsServer::new();
        assert!(server.render().is_none());
    }
}
