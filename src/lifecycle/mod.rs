//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! CircuitBreaker::new:
//!     spawn recovery scheduler → holds a ShutdownListener
//!
//! CircuitBreaker dropped:
//!     breaker's own Shutdown triggered → scheduler loop exits
//!
//! Process shutdown (optional, shared):
//!     Shutdown::trigger → every scheduler subscribed to it exits
//!     Shutdown dropped untriggered → schedulers keep running
//! ```

pub mod shutdown;

pub use shutdown::{Shutdown, ShutdownListener};
