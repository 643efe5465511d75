//! Configuration schema definitions.
//!
//! All file-facing types derive Serde traits and default every field, so a
//! minimal or empty TOML file is valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::breaker::policy::{Policy, Thresholds};

/// Root configuration for the demo driver.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DemoConfig {
    /// Breaker under test.
    pub breaker: BreakerConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,

    /// Simulated traffic.
    pub driver: DriverConfig,
}

/// Resolved, immutable breaker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Name used in logs, metrics and refusal errors.
    pub name: String,

    /// Failure-counting policy.
    pub policy: Policy,

    /// Cumulative failure limit under `max_fails`.
    pub max_fails: u64,

    /// Consecutive failure limit under `max_consecutive_fails`.
    pub max_consecutive_fails: u64,

    /// Cooldown before an open breaker offers a trial call, in milliseconds.
    pub open_interval_ms: u64,

    /// Also clear the cumulative counter on success.
    pub reset_on_success: bool,
}

pub const DEFAULT_MAX_FAILS: u64 = 5;
pub const DEFAULT_MAX_CONSECUTIVE_FAILS: u64 = 5;
pub const DEFAULT_OPEN_INTERVAL: Duration = Duration::from_secs(5);

impl BreakerConfig {
    pub fn open_interval(&self) -> Duration {
        Duration::from_millis(self.open_interval_ms)
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            max_fails: self.max_fails,
            max_consecutive_fails: self.max_consecutive_fails,
        }
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        BreakerOptions::default().into()
    }
}

/// Optional settings accepted by [`CircuitBreaker::new`].
///
/// Every `None` takes the documented default.
///
/// [`CircuitBreaker::new`]: crate::breaker::CircuitBreaker::new
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakerOptions {
    /// Defaults to `"default"`.
    pub name: Option<String>,
    /// Defaults to [`Policy::MaxFails`].
    pub policy: Policy,
    /// Defaults to 5.
    pub max_fails: Option<u64>,
    /// Defaults to 5.
    pub max_consecutive_fails: Option<u64>,
    /// Defaults to 5 seconds.
    pub open_interval: Option<Duration>,
    pub reset_on_success: bool,
}

impl From<BreakerOptions> for BreakerConfig {
    fn from(opts: BreakerOptions) -> Self {
        let open_interval = opts.open_interval.unwrap_or(DEFAULT_OPEN_INTERVAL);
        Self {
            name: opts.name.unwrap_or_else(|| "default".to_string()),
            policy: opts.policy,
            max_fails: opts.max_fails.unwrap_or(DEFAULT_MAX_FAILS),
            max_consecutive_fails: opts
                .max_consecutive_fails
                .unwrap_or(DEFAULT_MAX_CONSECUTIVE_FAILS),
            open_interval_ms: duration_to_ms_ceil(open_interval),
            reset_on_success: opts.reset_on_success,
        }
    }
}

/// Whole milliseconds, rounded up so a non-zero interval never becomes 0.
fn duration_to_ms_ceil(d: Duration) -> u64 {
    u64::try_from(d.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Expose a Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Simulated traffic against a flaky dependency.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Number of calls to fire.
    pub requests: u32,

    /// Delay between launching consecutive calls, in milliseconds.
    pub spacing_ms: u64,

    /// Probability that a simulated call fails.
    pub failure_rate: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            requests: 29,
            spacing_ms: 10,
            failure_rate: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let config = BreakerConfig::from(BreakerOptions::default());
        assert_eq!(config.name, "default");
        assert_eq!(config.policy, Policy::MaxFails);
        assert_eq!(config.max_fails, 5);
        assert_eq!(config.max_consecutive_fails, 5);
        assert_eq!(config.open_interval(), Duration::from_secs(5));
        assert!(!config.reset_on_success);
    }

    #[test]
    fn test_options_override() {
        let config = BreakerConfig::from(BreakerOptions {
            policy: Policy::MaxConsecutiveFails,
            max_consecutive_fails: Some(2),
            open_interval: Some(Duration::from_millis(50)),
            ..Default::default()
        });
        assert_eq!(config.policy, Policy::MaxConsecutiveFails);
        assert_eq!(config.max_consecutive_fails, 2);
        assert_eq!(config.max_fails, 5);
        assert_eq!(config.open_interval_ms, 50);
    }

    #[test]
    fn test_sub_millisecond_interval_rounds_up() {
        let config = BreakerConfig::from(BreakerOptions {
            open_interval: Some(Duration::from_micros(500)),
            ..Default::default()
        });
        assert_eq!(config.open_interval_ms, 1);

        let config = BreakerConfig::from(BreakerOptions {
            open_interval: Some(Duration::from_micros(1_500)),
            ..Default::default()
        });
        assert_eq!(config.open_interval_ms, 2);

        let config = BreakerConfig::from(BreakerOptions {
            open_interval: Some(Duration::ZERO),
            ..Default::default()
        });
        assert_eq!(config.open_interval_ms, 0);
    }

    #[test]
    fn test_partial_toml() {
        let config: DemoConfig = toml::from_str(
            r#"
            [breaker]
            name = "payments"
            policy = "max_consecutive_fails"
            max_consecutive_fails = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.breaker.name, "payments");
        assert_eq!(config.breaker.policy, Policy::MaxConsecutiveFails);
        assert_eq!(config.breaker.max_fails, 5);
        assert_eq!(config.breaker.open_interval_ms, 5000);
        assert_eq!(config.driver.requests, 29);
    }

    #[test]
    fn test_unknown_policy_is_unbounded() {
        let config: BreakerConfig = toml::from_str(r#"policy = "sliding_window""#).unwrap();
        assert_eq!(config.policy, Policy::Unbounded);
    }
}
