//! Per-fetch diagnostics of provider attempts.

use crate::errors::FetchError;
use crate::models::ProviderId;

/// Record of a single provider attempt during a fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderAttempt {
    pub provider_id: ProviderId,
    pub error: Option<FetchError>,
    pub success: bool,
}

/// Everything that happened during one `fetch_player_stats` call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
    /// Set when the returned record came from the synthetic generator.
    pub synthetic: bool,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_error(&mut self, provider_id: ProviderId, error: FetchError) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            error: Some(error),
            success: false,
        });
    }

    pub fn record_success(&mut self, provider_id: ProviderId) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            error: None,
            success: true,
        });
    }

    pub fn record_synthetic(&mut self) {
        self.synthetic = true;
    }

    /// Summary for logging/debugging, e.g. `A: NOT_FOUND -> B: SUCCESS`.
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = self
            .attempts
            .iter()
            .map(|a| match (&a.error, a.success) {
                (_, true) => format!("{}: SUCCESS", a.provider_id),
                (Some(err), false) => format!("{}: {}", a.provider_id, err.label()),
                (None, false) => format!("{}: UNKNOWN", a.provider_id),
            })
            .collect();

        if self.synthetic {
            parts.push("SYNTHETIC".to_string());
        }

        parts.join(" -> ")
    }

    /// Check if any provider succeeded.
    pub fn has_success(&self) -> bool {
        self.attempts.iter().any(|a| a.success)
    }

    /// Get all errors.
    pub fn errors(&self) -> Vec<(&ProviderId, &FetchError)> {
        self.attempts
            .iter()
            .filter_map(|a| a.error.as_ref().map(|e| (&a.provider_id, e)))
            .collect()
    }
}
