//! Breaker state controller.
//!
//! # Responsibilities
//! - Pre-call gate: refuse while open
//! - Post-call update: count failures, drive transitions
//! - Signal the recovery scheduler on every open transition
//!
//! # Design Decisions
//! - `state` lives in an atomic so the gate never takes the lock
//! - `state` is only written while `counters` is locked
//! - Open signal is a single-slot `Notify`: callers never block on it

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::Notify;

use crate::breaker::error::BreakerError;
use crate::breaker::policy::threshold_exceeded;
use crate::breaker::state::CircuitState;
use crate::config::BreakerConfig;
use crate::observability::metrics;

/// Fields that always change together.
#[derive(Debug, Default)]
struct Counters {
    /// Failures counted in the current closed period.
    failures: u64,
    /// When the current open episode began.
    opened_at: Option<Instant>,
    /// Incremented on every transition into `Open`.
    episode: u64,
}

/// A pending cooldown, as seen by the recovery scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenEpisode {
    pub id: u64,
    pub deadline: Instant,
}

/// Owns the mutable breaker state and implements the transition rules.
#[derive(Debug)]
pub struct StateController {
    config: BreakerConfig,
    state: AtomicU8,
    counters: Mutex<Counters>,
    open_signal: Notify,
}

impl StateController {
    pub fn new(config: BreakerConfig) -> Self {
        metrics::record_state(&config.name, CircuitState::Closed);
        Self {
            config,
            state: AtomicU8::new(CircuitState::Closed as u8),
            counters: Mutex::new(Counters::default()),
            open_signal: Notify::new(),
        }
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Current state. May be stale by the time the caller acts on it.
    pub fn state(&self) -> CircuitState {
        CircuitState::from(self.state.load(Ordering::Acquire))
    }

    /// Failure counter. Takes the lock.
    pub fn failures(&self) -> u64 {
        self.lock().failures
    }

    /// Pre-call gate. Only `Open` refuses; `HalfOpen` lets the trial through.
    pub fn before_call<E>(&self) -> Result<(), BreakerError<E>> {
        if self.state() == CircuitState::Open {
            metrics::record_call(self.name(), "refused");
            tracing::trace!(breaker = %self.name(), "Call refused, circuit open");
            return Err(BreakerError::Refused {
                name: self.config.name.clone(),
            });
        }
        Ok(())
    }

    /// Post-call update. Serialized under the lock.
    pub fn after_call(&self, succeeded: bool) {
        let mut counters = self.lock();
        let current = self.state();

        if succeeded {
            metrics::record_call(self.name(), "success");
            // A late success ending an open episode cancels its cooldown,
            // and with it the counter reset the cooldown would have done.
            if self.config.policy.resets_on_success()
                || self.config.reset_on_success
                || current == CircuitState::Open
            {
                counters.failures = 0;
            }
            if current != CircuitState::Closed {
                self.transition(&mut counters, current, CircuitState::Closed);
            }
            return;
        }

        metrics::record_call(self.name(), "failure");
        match current {
            CircuitState::HalfOpen => {
                self.transition(&mut counters, current, CircuitState::Open);
            }
            CircuitState::Closed | CircuitState::Open => {
                counters.failures = counters.failures.saturating_add(1);
                tracing::debug!(
                    breaker = %self.name(),
                    failures = counters.failures,
                    policy = %self.config.policy,
                    "Failure recorded"
                );
                // A call admitted just before the breaker opened can still
                // fail afterwards; that is not a new open episode.
                if current == CircuitState::Closed
                    && threshold_exceeded(self.config.policy, counters.failures, self.config.thresholds())
                {
                    self.transition(&mut counters, current, CircuitState::Open);
                }
            }
        }
    }

    /// Wait until some caller has opened the breaker.
    ///
    /// A signal sent while nobody waits is kept, but only one.
    pub async fn opened(&self) {
        self.open_signal.notified().await;
    }

    /// The cooldown the scheduler should wait out, if the breaker is open.
    pub fn open_episode(&self) -> Option<OpenEpisode> {
        let counters = self.lock();
        if self.state() != CircuitState::Open {
            return None;
        }
        let opened_at = counters.opened_at?;
        Some(OpenEpisode {
            id: counters.episode,
            deadline: opened_at + self.config.open_interval(),
        })
    }

    /// Move `Open` to `HalfOpen` if `episode` is still the current one.
    ///
    /// Returns false when the episode already ended (a late success closed
    /// the breaker and cleared the counter) or was superseded by a newer one.
    pub fn try_half_open(&self, episode: u64) -> bool {
        let mut counters = self.lock();
        let current = self.state();
        if current != CircuitState::Open || counters.episode != episode {
            return false;
        }
        counters.failures = 0;
        self.transition(&mut counters, current, CircuitState::HalfOpen);
        true
    }

    fn transition(&self, counters: &mut Counters, from: CircuitState, to: CircuitState) {
        self.state.store(to as u8, Ordering::Release);
        metrics::record_transition(self.name(), to);

        match to {
            CircuitState::Open => {
                counters.opened_at = Some(Instant::now());
                counters.episode = counters.episode.wrapping_add(1);
                tracing::warn!(
                    breaker = %self.name(),
                    from = %from,
                    failures = counters.failures,
                    open_interval_ms = self.config.open_interval_ms,
                    "Circuit breaker opened"
                );
                self.open_signal.notify_one();
            }
            CircuitState::HalfOpen => {
                tracing::info!(breaker = %self.name(), from = %from, "Circuit breaker half-open, next call is a trial");
            }
            CircuitState::Closed => {
                counters.opened_at = None;
                tracing::info!(
                    breaker = %self.name(),
                    from = %from,
                    failures = counters.failures,
                    "Circuit breaker closed"
                );
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        // Counters stay consistent even if a holder panicked.
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
