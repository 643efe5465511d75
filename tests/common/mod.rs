//! Shared helpers for breaker integration tests.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use circuit_breaker::{BreakerOptions, CircuitBreaker, Policy};

/// Error returned by a simulated dependency; carries the call number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyError(pub u32);

impl fmt::Display for DependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dependency call {} failed", self.0)
    }
}

impl std::error::Error for DependencyError {}

/// A programmable dependency. `outcome(n)` decides whether call `n`
/// (1-based) succeeds.
pub struct FlakyDependency<F> {
    calls: AtomicU32,
    outcome: F,
}

impl<F> FlakyDependency<F>
where
    F: Fn(u32) -> bool + Send + Sync,
{
    pub fn new(outcome: F) -> Self {
        Self {
            calls: AtomicU32::new(0),
            outcome,
        }
    }

    pub async fn call(&self) -> Result<u32, DependencyError> {
        self.call_blocking()
    }

    pub fn call_blocking(&self) -> Result<u32, DependencyError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if (self.outcome)(n) {
            Ok(n)
        } else {
            Err(DependencyError(n))
        }
    }

    /// How many times the dependency was actually invoked.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Breaker with the given policy, threshold and open interval.
pub fn breaker(policy: Policy, threshold: u64, open_interval_ms: u64) -> CircuitBreaker {
    let (max_fails, max_consecutive_fails) = match policy {
        Policy::MaxConsecutiveFails => (None, Some(threshold)),
        _ => (Some(threshold), None),
    };
    CircuitBreaker::new(BreakerOptions {
        name: Some(format!("test-{}", policy)),
        policy,
        max_fails,
        max_consecutive_fails,
        open_interval: Some(Duration::from_millis(open_interval_ms)),
        reset_on_success: false,
    })
}

/// Sleep for `ms` milliseconds.
#[allow(dead_code)]
pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
