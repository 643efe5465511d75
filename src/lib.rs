//! Local circuit breaker for guarding calls to unreliable dependencies.

pub mod breaker;
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use breaker::{BreakerError, BreakerRegistry, CircuitBreaker, CircuitState, Policy};
pub use config::{BreakerConfig, BreakerOptions};
pub use lifecycle::Shutdown;
