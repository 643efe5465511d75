//! Registry of named breakers, one per protected dependency.

use dashmap::DashMap;
use std::sync::Arc;

use crate::breaker::executor::{BreakerSnapshot, CircuitBreaker};
use crate::config::BreakerConfig;
use crate::lifecycle::Shutdown;

/// A thread-safe map of dependency name to its breaker.
///
/// Breakers are created lazily on first lookup. All of them stop their
/// recovery schedulers when [`shutdown`](Self::shutdown) is called. Dropping
/// the registry does not stop them: handles that outlive it keep recovering.
#[derive(Debug, Default)]
pub struct BreakerRegistry {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    shutdown: Shutdown,
}

impl BreakerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Breaker for `name`, creating it from `template` if missing.
    ///
    /// The template's own name is replaced with `name`. An existing breaker
    /// keeps the configuration it was created with.
    pub fn get_or_create(&self, name: &str, template: &BreakerConfig) -> Arc<CircuitBreaker> {
        if let Some(existing) = self.breakers.get(name) {
            return Arc::clone(existing.value());
        }

        let entry = self.breakers.entry(name.to_string()).or_insert_with(|| {
            let config = BreakerConfig {
                name: name.to_string(),
                ..template.clone()
            };
            Arc::new(CircuitBreaker::with_shutdown(config, &self.shutdown))
        });
        Arc::clone(entry.value())
    }

    pub fn get(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(name).map(|r| Arc::clone(r.value()))
    }

    /// Forget a breaker. Its scheduler stops once the last handle is gone.
    pub fn remove(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.breakers.remove(name).map(|(_, breaker)| breaker)
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }

    /// Snapshots of every breaker, sorted by name.
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        let mut snaps: Vec<_> = self.breakers.iter().map(|r| r.value().snapshot()).collect();
        snaps.sort_by(|a, b| a.name.cmp(&b.name));
        snaps
    }

    /// Stop every recovery scheduler owned by this registry.
    pub fn shutdown(&self) {
        tracing::info!(breakers = self.breakers.len(), "Stopping breaker registry");
        self.shutdown.trigger();
    }
}
