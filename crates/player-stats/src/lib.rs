//! Statline Player Stats Crate
//!
//! This crate fetches Warzone player statistics from several third-party
//! providers and hands callers one canonical record, whichever provider
//! answered.
//!
//! # Overview
//!
//! The engine supports:
//! - Multiple providers tried strictly in a configured priority order
//! - Per-provider sliding-window rate limiting shared across concurrent fetches
//! - Per-provider retry policies (backoff, 429 penalties, no retry on 404)
//! - Normalization of three response layouts into one record
//! - An optional synthetic fallback, always tagged as such
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |     Caller       | --> |  PlayerHandle    |  (name + platform)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | ProviderRegistry |  (ordered fallback + pacing)
//!                          +------------------+
//!                                  |
//!                                  v
//!                         +-------------------+
//!                         | HttpStatsProvider |  (rate limit, retry, HTTP)
//!                         +-------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   Normalizer     |  (flat / nested / key-value)
//!                          +------------------+
//!                                  |
//!                                  v
//!                      +-----------------------+
//!                      | CanonicalStatsRecord  |  (or synthetic, or None)
//!                      +-----------------------+
//! ```
//!
//! # Core Types
//!
//! - [`PlayerHandle`] - Player name (possibly `name#1234`) and [`Platform`]
//! - [`CanonicalStatsRecord`] - Provider-agnostic statistics
//! - [`ProviderConfig`] - Static description of one HTTP provider
//! - [`ProviderRegistry`] - The fallback orchestrator and sole fetch entry point
//! - [`EngineConfig`] - Priority, fallback mode, pacing and timeouts
//!
//! # Type Aliases
//!
//! - [`ProviderId`] - Provider identifier (e.g., "RAPIDAPI_COD", "TRACKER_GG")

pub mod config;
pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;
pub mod synthetic;

// Re-export all public types from models
pub use models::{
    normalize_platform, strip_discriminator, CanonicalStatsRecord, Platform, PlayerHandle,
    ProviderId,
};

// Re-export configuration and errors
pub use config::{EngineConfig, FallbackMode, DEFAULT_PACING_DELAY};
pub use errors::{
    AttemptFailure, EngineError, FetchError, FetchOutcome, RetryDecision, RetryPolicy,
    MAX_RATE_LIMIT_EXTENSIONS,
};

// Re-export provider types
pub use provider::catalog;
pub use provider::{
    normalize, normalize_body, DiscriminatorPolicy, HttpRequest, HttpResponse, HttpStatsProvider,
    HttpTransport, ProviderConfig, ReqwestTransport, ResponseShape, StatsProvider, TransportError,
    DEFAULT_REQUEST_TIMEOUT,
};

// Re-export registry types
pub use registry::{
    Admission, FetchDiagnostics, ProviderAttempt, ProviderRegistry, RateLimitConfig, RateLimiter,
};

pub use synthetic::{SyntheticGenerator, SYNTHETIC_PROVIDER_ID};
