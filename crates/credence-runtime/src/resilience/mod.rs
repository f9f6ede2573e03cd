//! Resilience patterns for credence-runtime.
//!
//! - Circuit breaker per capability
//! - Fallback strategies
//!
//! Retry with backoff lives with the source fetchers in [`crate::sources`].

mod circuit_breaker;
mod fallback;

pub use circuit_breaker::{Admission, CircuitBreaker, CircuitBreakerConfig, CircuitState, CircuitStats};
pub use fallback::FallbackStrategy;
