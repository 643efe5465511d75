//! Circuit breaker demo driver.
//!
//! Fires concurrent calls at a simulated flaky dependency through one
//! breaker and logs every outcome.
//!
//! ```text
//!   spawn call 1..N (spacing_ms apart)
//!        │
//!        ▼
//!   ┌──────────────┐  refused   ┌───────────────┐
//!   │CircuitBreaker│──────────▶│ log "refused" │
//!   └──────┬───────┘            └───────────────┘
//!          │ admitted
//!          ▼
//!   ┌──────────────┐  Err/Ok    ┌───────────────┐
//!   │flaky service │──────────▶│ log outcome    │
//!   └──────────────┘            └───────────────┘
//! ```

use clap::Parser;
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;

use circuit_breaker::config::{load_config, validation::validate_config, DemoConfig};
use circuit_breaker::observability::{logging, metrics};
use circuit_breaker::{BreakerError, CircuitBreaker, Policy};

#[derive(Parser)]
#[command(name = "breaker-demo")]
#[command(about = "Drive a circuit breaker with a simulated flaky dependency", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Failure-counting policy (max_fails, max_consecutive_fails).
    #[arg(long)]
    policy: Option<String>,

    #[arg(long)]
    max_fails: Option<u64>,

    #[arg(long)]
    max_consecutive_fails: Option<u64>,

    #[arg(long)]
    open_interval_ms: Option<u64>,

    /// Number of calls to fire.
    #[arg(short = 'n', long)]
    requests: Option<u32>,

    #[arg(long)]
    spacing_ms: Option<u64>,

    /// Probability in [0, 1] that a simulated call fails.
    #[arg(long)]
    failure_rate: Option<f64>,

    /// Print the final breaker snapshot as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn apply(&self, config: &mut DemoConfig) {
        if let Some(policy) = &self.policy {
            config.breaker.policy = Policy::from(policy.clone());
        }
        if let Some(v) = self.max_fails {
            config.breaker.max_fails = v;
        }
        if let Some(v) = self.max_consecutive_fails {
            config.breaker.max_consecutive_fails = v;
        }
        if let Some(v) = self.open_interval_ms {
            config.breaker.open_interval_ms = v;
        }
        if let Some(v) = self.requests {
            config.driver.requests = v;
        }
        if let Some(v) = self.spacing_ms {
            config.driver.spacing_ms = v;
        }
        if let Some(v) = self.failure_rate {
            config.driver.failure_rate = v;
        }
    }
}

#[derive(Debug, Error)]
#[error("[id: {0}] service failed")]
struct ServiceError(u32);

async fn service_method(id: u32, failure_rate: f64) -> Result<String, ServiceError> {
    let (latency_ms, fails) = {
        let mut rng = rand::thread_rng();
        (rng.gen_range(1..20), rng.gen_bool(failure_rate))
    };
    tokio::time::sleep(Duration::from_millis(latency_ms)).await;
    if fails {
        return Err(ServiceError(id));
    }
    Ok(format!("[id: {id}] done."))
}

async fn make_service_call(id: u32, breaker: Arc<CircuitBreaker>, failure_rate: f64) {
    match breaker.execute(|| service_method(id, failure_rate)).await {
        Ok(resp) => tracing::info!(id, state = %breaker.state(), "success: {}", resp),
        Err(BreakerError::Refused { .. }) => {
            tracing::warn!(id, state = %breaker.state(), "refused: circuit open")
        }
        Err(BreakerError::Operation(e)) => {
            tracing::warn!(id, state = %breaker.state(), error = %e, "call failed")
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => {
            let mut config = DemoConfig::default();
            config.breaker.name = "flaky-service".to_string();
            config.breaker.open_interval_ms = 50;
            config
        }
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(circuit_breaker::config::ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let breaker = Arc::new(CircuitBreaker::from_config(config.breaker.clone()));
    let driver = config.driver.clone();

    tracing::info!(
        requests = driver.requests,
        spacing_ms = driver.spacing_ms,
        failure_rate = driver.failure_rate,
        "Starting demo"
    );

    let mut calls = JoinSet::new();
    for id in 1..=driver.requests {
        calls.spawn(make_service_call(id, breaker.clone(), driver.failure_rate));
        tokio::time::sleep(Duration::from_millis(driver.spacing_ms)).await;
    }

    tracing::info!("sent all the requests");
    while let Some(res) = calls.join_next().await {
        if let Err(e) = res {
            tracing::error!(error = %e, "call task panicked");
        }
    }
    tracing::info!("got all the responses, exiting.");

    let snapshot = breaker.snapshot();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!(
            "breaker '{}': state={} failures={}",
            snapshot.name, snapshot.state, snapshot.failures
        );
    }

    Ok(())
}
