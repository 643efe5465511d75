//! Metrics collection and exposition.
//!
//! # Metrics
//! - `breaker_calls_total` (counter): calls by breaker, outcome
//!   (`success`, `failure`, `refused`)
//! - `breaker_transitions_total` (counter): transitions by breaker, target state
//! - `breaker_state` (gauge): 0=closed, 1=open, 2=half-open
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

use crate::breaker::state::CircuitState;

/// Install the Prometheus recorder with an HTTP scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_call(breaker: &str, outcome: &'static str) {
    counter!("breaker_calls_total", "breaker" => breaker.to_owned(), "outcome" => outcome).increment(1);
}

pub fn record_transition(breaker: &str, to: CircuitState) {
    counter!("breaker_transitions_total", "breaker" => breaker.to_owned(), "to" => to.as_str())
        .increment(1);
    record_state(breaker, to);
}

pub fn record_state(breaker: &str, state: CircuitState) {
    gauge!("breaker_state", "breaker" => breaker.to_owned()).set(f64::from(state as u8));
}
