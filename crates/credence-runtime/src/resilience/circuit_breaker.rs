//! Per-capability circuit breaker.
//!
//! The critic and the extractor each own one circuit. A circuit opens after
//! `failure_threshold` consecutive failures and keeps the failure that
//! opened it, so every skipped call is recorded with a concrete reason
//! instead of a bare "unavailable". Once `recovery_timeout` has passed,
//! calls are admitted as trials until `success_threshold` of them succeed.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::capabilities::Capability;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening
    pub failure_threshold: u32,

    /// Time an open circuit waits before admitting trials
    #[serde(with = "crate::config::duration")]
    pub recovery_timeout: Duration,

    /// Trial successes needed to close again
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CircuitState {
    Closed { failures: u32 },
    Open { opened_at: Instant },
    HalfOpen { successes: u32 },
}

/// Whether a capability call may go ahead.
#[derive(Debug, Clone, PartialEq)]
pub enum Admission {
    Call,
    /// The circuit is recovering; this call's result decides it
    Trial,
    Skip {
        /// Failure that opened the circuit
        last_failure: String,
        retry_in: Duration,
    },
}

/// Counters for one capability since the breaker was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CircuitStats {
    pub calls: u64,
    pub failures: u64,
    pub skipped: u64,
    pub times_opened: u32,
}

#[derive(Debug)]
struct Circuit {
    state: CircuitState,
    last_failure: Option<String>,
    stats: CircuitStats,
}

impl Default for Circuit {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed { failures: 0 },
            last_failure: None,
            stats: CircuitStats::default(),
        }
    }
}

impl Circuit {
    fn open(&mut self) {
        self.state = CircuitState::Open {
            opened_at: Instant::now(),
        };
        self.stats.times_opened += 1;
    }
}

#[derive(Debug)]
pub struct CircuitBreaker {
    critic: Mutex<Circuit>,
    extractor: Mutex<Circuit>,
    config: CircuitBreakerConfig,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            critic: Mutex::new(Circuit::default()),
            extractor: Mutex::new(Circuit::default()),
            config,
        }
    }

    fn circuit(&self, capability: Capability) -> &Mutex<Circuit> {
        match capability {
            Capability::Critic => &self.critic,
            Capability::Extractor => &self.extractor,
        }
    }

    /// Decide whether to call `capability` now. An open circuit whose
    /// recovery timeout has passed moves to half-open here.
    pub fn admit(&self, capability: Capability) -> Admission {
        let mut circuit = self.circuit(capability).lock();
        let admission = match circuit.state {
            CircuitState::Closed { .. } => Admission::Call,
            CircuitState::HalfOpen { .. } => Admission::Trial,
            CircuitState::Open { opened_at } => {
                let elapsed = opened_at.elapsed();
                if elapsed >= self.config.recovery_timeout {
                    circuit.state = CircuitState::HalfOpen { successes: 0 };
                    tracing::info!(capability = %capability, "Circuit half-open, admitting trial calls");
                    Admission::Trial
                } else {
                    circuit.stats.skipped += 1;
                    return Admission::Skip {
                        last_failure: circuit.last_failure.clone().unwrap_or_default(),
                        retry_in: self.config.recovery_timeout - elapsed,
                    };
                }
            }
        };
        circuit.stats.calls += 1;
        admission
    }

    pub fn record_success(&self, capability: Capability) {
        let mut circuit = self.circuit(capability).lock();
        match circuit.state {
            CircuitState::HalfOpen { successes } if successes + 1 >= self.config.success_threshold => {
                circuit.state = CircuitState::Closed { failures: 0 };
                circuit.last_failure = None;
                tracing::info!(capability = %capability, "Circuit closed after successful trials");
            }
            CircuitState::HalfOpen { successes } => {
                circuit.state = CircuitState::HalfOpen {
                    successes: successes + 1,
                };
            }
            CircuitState::Closed { .. } => circuit.state = CircuitState::Closed { failures: 0 },
            // a call admitted before the circuit opened
            CircuitState::Open { .. } => {}
        }
    }

    pub fn record_failure(&self, capability: Capability, reason: &str) {
        let mut circuit = self.circuit(capability).lock();
        circuit.stats.failures += 1;
        circuit.last_failure = Some(reason.to_string());

        match circuit.state {
            CircuitState::Closed { failures } if failures + 1 >= self.config.failure_threshold => {
                circuit.open();
                tracing::warn!(
                    capability = %capability,
                    failures = failures + 1,
                    reason,
                    "Circuit opened after repeated failures"
                );
            }
            CircuitState::Closed { failures } => {
                circuit.state = CircuitState::Closed {
                    failures: failures + 1,
                };
            }
            CircuitState::HalfOpen { .. } => {
                circuit.open();
                tracing::warn!(capability = %capability, reason, "Trial call failed, circuit reopened");
            }
            CircuitState::Open { .. } => {}
        }
    }

    pub fn state(&self, capability: Capability) -> CircuitState {
        self.circuit(capability).lock().state.clone()
    }

    pub fn is_open(&self, capability: Capability) -> bool {
        matches!(self.state(capability), CircuitState::Open { .. })
    }

    pub fn stats(&self, capability: Capability) -> CircuitStats {
        self.circuit(capability).lock().stats
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}
