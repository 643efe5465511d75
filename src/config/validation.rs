//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges. All errors are
//! collected, not just the first.

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{BreakerConfig, DemoConfig};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("breaker name must not be empty")]
    EmptyName,

    #[error("open_interval_ms must be greater than zero")]
    ZeroOpenInterval,

    #[error("failure_rate must be within [0, 1], got {0}")]
    FailureRateOutOfRange(f64),

    #[error("driver.requests must be greater than zero")]
    NoRequests,

    #[error("invalid metrics_address '{0}'")]
    MetricsAddress(String),

    #[error("unknown log level '{0}'")]
    LogLevel(String),
}

/// Validate a breaker configuration.
pub fn validate_breaker(config: &BreakerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_breaker(config, &mut errors);
    into_result(errors)
}

/// Validate the full driver configuration.
pub fn validate_config(config: &DemoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_breaker(&config.breaker, &mut errors);

    let rate = config.driver.failure_rate;
    if !(0.0..=1.0).contains(&rate) {
        errors.push(ValidationError::FailureRateOutOfRange(rate));
    }
    if config.driver.requests == 0 {
        errors.push(ValidationError::NoRequests);
    }

    let obs = &config.observability;
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::MetricsAddress(obs.metrics_address.clone()));
    }
    if obs.log_level.parse::<tracing::Level>().is_err() {
        errors.push(ValidationError::LogLevel(obs.log_level.clone()));
    }

    into_result(errors)
}

fn check_breaker(config: &BreakerConfig, errors: &mut Vec<ValidationError>) {
    if config.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }
    if config.open_interval_ms == 0 {
        errors.push(ValidationError::ZeroOpenInterval);
    }
}

fn into_result(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
