//! Breaker state.
//!
//! # State Transitions
//! ```text
//! Closed   → Open:     failure pushes the counter to the policy threshold
//! Open     → HalfOpen: recovery scheduler, after the open interval
//! HalfOpen → Closed:   trial call succeeds
//! HalfOpen → Open:     trial call fails
//! ```

use serde::Serialize;

/// Breaker state enum.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl CircuitState {
    /// Name reported to observers: `closed`, `open` or `half-open`.
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        }
    }
}

impl From<u8> for CircuitState {
    fn from(val: u8) -> Self {
        match val {
            0 => CircuitState::Closed,
            2 => CircuitState::HalfOpen,
            // Only valid discriminants are ever stored; refuse on anything else.
            _ => CircuitState::Open,
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
