//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! breaker controller produces:
//!     → tracing events (transitions at info/warn, per-call at debug/trace)
//!     → metrics.rs (call outcomes, transitions, state gauge)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Library code only emits; installing subscribers/recorders is the
//!   binary's job
//! - Every event carries the breaker name

pub mod logging;
pub mod metrics;
