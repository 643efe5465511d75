//! Execution façade: the public entry point of a breaker.

use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{self, Handle};

use crate::breaker::controller::StateController;
use crate::breaker::error::BreakerError;
use crate::breaker::scheduler::RecoveryScheduler;
use crate::breaker::state::CircuitState;
use crate::config::{BreakerConfig, BreakerOptions};
use crate::lifecycle::{Shutdown, ShutdownListener};

/// Point-in-time view of a breaker, for logs and dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub failures: u64,
}

/// Guard around calls to one unreliable dependency.
///
/// Share it between callers behind an `Arc`. Dropping the last handle stops
/// the recovery scheduler.
#[derive(Debug)]
pub struct CircuitBreaker {
    controller: Arc<StateController>,
    stop: Shutdown,
}

impl CircuitBreaker {
    /// Create a breaker; unset options take their defaults.
    pub fn new(options: BreakerOptions) -> Self {
        Self::from_config(options.into())
    }

    pub fn from_config(config: BreakerConfig) -> Self {
        Self::build(config, ShutdownListener::never())
    }

    /// Create a breaker whose scheduler also stops when `shutdown` fires.
    pub fn with_shutdown(config: BreakerConfig, shutdown: &Shutdown) -> Self {
        Self::build(config, shutdown.listener())
    }

    fn build(config: BreakerConfig, shutdown: ShutdownListener) -> Self {
        tracing::info!(
            breaker = %config.name,
            policy = %config.policy,
            max_fails = config.max_fails,
            max_consecutive_fails = config.max_consecutive_fails,
            open_interval_ms = config.open_interval_ms,
            reset_on_success = config.reset_on_success,
            "Circuit breaker initialized"
        );

        let controller = Arc::new(StateController::new(config));
        let stop = Shutdown::new();
        let scheduler = RecoveryScheduler::new(controller.clone(), stop.listener(), shutdown);
        spawn_scheduler(controller.name(), scheduler);

        Self { controller, stop }
    }

    /// Run `operation` under the breaker.
    ///
    /// Refused without invoking `operation` while open. Otherwise the
    /// operation runs once, with no lock held, and its outcome updates the
    /// breaker before being handed back unchanged.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.controller.before_call::<E>()?;
        let result = operation().await;
        self.controller.after_call(result.is_ok());
        result.map_err(BreakerError::Operation)
    }

    /// Blocking counterpart of [`execute`](Self::execute) for callers on
    /// plain threads.
    pub fn execute_blocking<F, T, E>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.controller.before_call::<E>()?;
        let result = operation();
        self.controller.after_call(result.is_ok());
        result.map_err(BreakerError::Operation)
    }

    /// Best-effort current state.
    pub fn state(&self) -> CircuitState {
        self.controller.state()
    }

    pub fn failures(&self) -> u64 {
        self.controller.failures()
    }

    pub fn name(&self) -> &str {
        self.controller.name()
    }

    pub fn config(&self) -> &BreakerConfig {
        self.controller.config()
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        BreakerSnapshot {
            name: self.name().to_string(),
            state: self.state(),
            failures: self.failures(),
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerOptions::default())
    }
}

impl Drop for CircuitBreaker {
    fn drop(&mut self) {
        self.stop.trigger();
    }
}

/// Run the scheduler on the ambient Tokio runtime, or on a dedicated
/// single-threaded runtime when the breaker is built outside of one.
fn spawn_scheduler(name: &str, scheduler: RecoveryScheduler) {
    if let Ok(handle) = Handle::try_current() {
        handle.spawn(scheduler.run());
        return;
    }

    let spawned = std::thread::Builder::new()
        .name(format!("breaker-{name}"))
        .spawn(move || match runtime::Builder::new_current_thread().enable_time().build() {
            Ok(rt) => rt.block_on(scheduler.run()),
            Err(e) => tracing::error!(error = %e, "Failed to build recovery scheduler runtime"),
        });

    if let Err(e) = spawned {
        tracing::error!(breaker = %name, error = %e, "Failed to spawn recovery scheduler thread");
    }
}
