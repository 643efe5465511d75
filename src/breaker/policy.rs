//! Failure-counting policies and the closed-state threshold decision.

use serde::{Deserialize, Serialize};

/// How failures are counted while the breaker is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Policy {
    /// Cumulative failures, regardless of successes in between.
    #[default]
    MaxFails,
    /// Failures in an uninterrupted run; any success resets the count.
    MaxConsecutiveFails,
    /// Unrecognized policy. The threshold is never exceeded.
    Unbounded,
}

impl Policy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::MaxFails => "max_fails",
            Policy::MaxConsecutiveFails => "max_consecutive_fails",
            Policy::Unbounded => "unbounded",
        }
    }

    /// Whether a success while closed clears the failure counter.
    pub fn resets_on_success(&self) -> bool {
        matches!(self, Policy::MaxConsecutiveFails)
    }
}

impl From<String> for Policy {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "max_fails" | "maxfails" => Policy::MaxFails,
            "max_consecutive_fails" | "maxconsecutivefails" => Policy::MaxConsecutiveFails,
            other => {
                tracing::warn!(policy = %other, "Unknown breaker policy, breaker will never open");
                Policy::Unbounded
            }
        }
    }
}

impl From<Policy> for String {
    fn from(policy: Policy) -> Self {
        policy.as_str().to_string()
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Limits the threshold decision is made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub max_fails: u64,
    pub max_consecutive_fails: u64,
}

/// Decide whether `failures` has reached the limit for `policy`.
pub fn threshold_exceeded(policy: Policy, failures: u64, limits: Thresholds) -> bool {
    match policy {
        Policy::MaxFails => failures >= limits.max_fails,
        Policy::MaxConsecutiveFails => failures >= limits.max_consecutive_fails,
        Policy::Unbounded => false,
    }
}
