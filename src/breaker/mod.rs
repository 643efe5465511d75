//! Circuit breaker subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → executor.rs (CircuitBreaker::execute)
//!     → controller.rs (gate: refuse while open, lock-free)
//!     → operation runs, no lock held
//!     → controller.rs (update under lock, policy.rs decides threshold)
//!     → on open: single-slot signal → scheduler.rs
//!     → caller gets the operation's result or a refusal
//!
//! scheduler.rs (one task per breaker):
//!     open signal → wait open interval → half-open, counter reset
//! ```
//!
//! # Design Decisions
//! - One breaker per protected dependency; registry.rs maps names to them
//! - Operation errors are observed, never transformed or retried
//! - Cumulative counter survives successes unless `reset_on_success` is set

pub mod controller;
pub mod error;
pub mod executor;
pub mod policy;
pub mod registry;
pub mod scheduler;
pub mod state;

pub use error::BreakerError;
pub use executor::{BreakerSnapshot, CircuitBreaker};
pub use policy::Policy;
pub use registry::BreakerRegistry;
pub use state::CircuitState;
