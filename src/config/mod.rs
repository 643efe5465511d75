//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! BreakerOptions (code, all fields optional)
//!     → BreakerConfig (defaults filled, immutable)
//!
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (range checks)
//!     → DemoConfig (validated)
//! ```
//!
//! # Design Decisions
//! - Breaker config is fixed at construction; no hot reload
//! - All fields have defaults to allow minimal configs
//! - Unknown policy names degrade to a breaker that never opens

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{BreakerConfig, BreakerOptions, DemoConfig, DriverConfig, ObservabilityConfig};
pub use validation::ValidationError;
