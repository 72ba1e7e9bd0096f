//! Error types and retry classification for the player stats crate.
//!
//! This module provides:
//! - [`FetchError`]: Why a single provider failed to produce a record
//! - [`EngineError`]: Contract violations detected while wiring the engine
//! - [`RetryPolicy`]: Classification of HTTP outcomes into abort/retry decisions

mod retry;

pub use retry::{AttemptFailure, RetryDecision, RetryPolicy, MAX_RATE_LIMIT_EXTENSIONS};

use std::time::Duration;

use thiserror::Error;

use crate::models::CanonicalStatsRecord;

/// Result of one provider fetch.
pub type FetchOutcome = Result<CanonicalStatsRecord, FetchError>;

/// Errors a provider can report for a single fetch.
///
/// None of these escape the orchestrator: they are logged, recorded in the
/// fetch diagnostics and the next provider is tried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The player does not exist for this provider.
    /// Never retried.
    #[error("Player not found")]
    NotFound,

    /// The provider kept throttling us after the allowed penalty waits.
    #[error("Rate limited (retry after {retry_after:?})")]
    RateLimited {
        /// How long the provider asked us to back off.
        retry_after: Duration,
    },

    /// Unexpected HTTP status, still failing after the retry budget.
    #[error("Transient failure: HTTP {status}")]
    Transient {
        /// Last HTTP status seen
        status: u16,
    },

    /// The provider answered successfully but the body has an unexpected shape.
    #[error("Malformed response: {message}")]
    MalformedResponse {
        /// What was wrong with the body
        message: String,
    },

    /// Connection failure or timeout, still failing after the retry budget.
    #[error("Network error: {message}")]
    Network {
        /// Description of the transport failure
        message: String,
    },
}

impl FetchError {
    /// Short, stable label used in diagnostics summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Transient { .. } => "TRANSIENT",
            Self::MalformedResponse { .. } => "MALFORMED",
            Self::Network { .. } => "NETWORK",
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }
}

/// Programming-contract violations.
///
/// These are raised while building the engine (or parsing caller input),
/// never while fetching.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A priority list names a provider that has no configuration.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// The engine was built without any provider.
    #[error("No providers configured")]
    NoProvidersConfigured,

    /// A provider configuration is unusable.
    #[error("Invalid configuration for {provider}: {message}")]
    InvalidConfig {
        /// Offending provider
        provider: String,
        /// What is wrong with it
        message: String,
    },

    /// A platform name that does not map onto any known platform.
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),
}
