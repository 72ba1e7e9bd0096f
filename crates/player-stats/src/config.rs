//! Engine-wide configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::ProviderId;

/// Default pause between two providers within one fetch.
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_secs(1);

/// What to return when every provider failed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// Return nothing.
    Strict,
    /// Return a generated record tagged `is_synthetic`.
    #[default]
    Synthetic,
}

impl fmt::Display for FallbackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Synthetic => write!(f, "synthetic"),
        }
    }
}

impl FromStr for FallbackMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "synthetic" => Ok(Self::Synthetic),
            other => Err(format!(
                "unknown fallback mode '{}' (expected 'strict' or 'synthetic')",
                other
            )),
        }
    }
}

/// Configuration of the fallback orchestrator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Provider ids in the order they are tried.
    /// Empty means "in the order the providers were given".
    pub priority: Vec<ProviderId>,
    pub fallback_mode: FallbackMode,
    /// Pause before every provider after the first within one fetch.
    pub pacing_delay: Duration,
    /// Per-request HTTP timeout for config-driven providers.
    pub request_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            priority: Vec::new(),
            fallback_mode: FallbackMode::Synthetic,
            pacing_delay: DEFAULT_PACING_DELAY,
            request_timeout: crate::provider::DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl EngineConfig {
    pub fn with_priority<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ProviderId>,
    {
        self.priority = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fallback_mode(mut self, mode: FallbackMode) -> Self {
        self.fallback_mode = mode;
        self
    }

    pub fn with_pacing_delay(mut self, delay: Duration) -> Self {
        self.pacing_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
