//! Provider registry module.
//!
//! This module provides orchestration for stats providers, including:
//! - Priority ordering and sequential fallback
//! - Sliding-window rate limiting per provider
//! - Per-fetch diagnostics of every provider attempt

mod diagnostics;
mod rate_limiter;
mod registry;

pub use diagnostics::{FetchDiagnostics, ProviderAttempt};
pub use rate_limiter::{Admission, RateLimitConfig, RateLimiter};
pub use registry::ProviderRegistry;
