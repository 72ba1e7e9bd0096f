use std::time::Duration;

use super::FetchError;

/// How many 429 penalty waits a single fetch may take on top of the regular
/// attempt budget.
pub const MAX_RATE_LIMIT_EXTENSIONS: u32 = 3;

/// A `Retry-After` hint is honoured up to this many times the configured penalty.
const MAX_RETRY_AFTER_FACTOR: u32 = 4;

/// A failed HTTP attempt, as seen by the retry policy.
#[derive(Clone, Debug, PartialEq)]
pub enum AttemptFailure {
    /// The provider answered with a non-success status.
    Status {
        status: u16,
        /// Parsed `Retry-After` header, when the provider sent one.
        retry_after: Option<Duration>,
    },
    /// Connection error or timeout; no status was received.
    Network { message: String },
}

/// What to do after a failed attempt.
///
/// | Condition | Decision |
/// |-----------|----------|
/// | 404 | `Abort(NotFound)` |
/// | 429 | `RetryAfterPenalty` (does not consume an attempt) |
/// | 502 / 503 | `Retry(base * attempt * 2)` |
/// | other status | `Retry(base * attempt)` |
/// | network / timeout | `Retry(base)` |
///
/// Once the attempt budget (or the penalty budget for 429) is spent, the
/// decision becomes `Abort` with the matching [`FetchError`].
#[derive(Clone, Debug, PartialEq)]
pub enum RetryDecision {
    Abort(FetchError),
    /// Wait, then retry. Counts against `max_retry_attempts`.
    Retry(Duration),
    /// Wait out a rate-limit penalty, then retry without consuming an attempt.
    RetryAfterPenalty(Duration),
}

/// Per-provider retry policy.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_backoff: Duration,
    rate_limit_penalty: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_backoff: Duration, rate_limit_penalty: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_backoff,
            rate_limit_penalty,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Classify a failed attempt.
    ///
    /// `attempt` is the 1-based number of the budgeted attempt that just
    /// failed; `penalties_taken` is how many 429 penalty waits this fetch has
    /// already gone through.
    pub fn classify(
        &self,
        failure: &AttemptFailure,
        attempt: u32,
        penalties_taken: u32,
    ) -> RetryDecision {
        let exhausted = attempt >= self.max_attempts;

        match failure {
            AttemptFailure::Status { status: 404, .. } => RetryDecision::Abort(FetchError::NotFound),

            AttemptFailure::Status {
                status: 429,
                retry_after,
            } => {
                // The provider's own hint wins when it asks for longer, within bounds
                let ceiling = self.rate_limit_penalty.saturating_mul(MAX_RETRY_AFTER_FACTOR);
                let penalty = retry_after
                    .map(|hint| hint.min(ceiling).max(self.rate_limit_penalty))
                    .unwrap_or(self.rate_limit_penalty);

                if penalties_taken >= MAX_RATE_LIMIT_EXTENSIONS {
                    RetryDecision::Abort(FetchError::RateLimited {
                        retry_after: penalty,
                    })
                } else {
                    RetryDecision::RetryAfterPenalty(penalty)
                }
            }

            AttemptFailure::Status { status, .. } if exhausted => {
                RetryDecision::Abort(FetchError::Transient { status: *status })
            }

            AttemptFailure::Status {
                status: 502 | 503, ..
            } => {
                RetryDecision::Retry(self.base_backoff.saturating_mul(attempt).saturating_mul(2))
            }

            AttemptFailure::Status { .. } => {
                RetryDecision::Retry(self.base_backoff.saturating_mul(attempt))
            }

            AttemptFailure::Network { message } if exhausted => {
                RetryDecision::Abort(FetchError::Network {
                    message: message.clone(),
                })
            }

            AttemptFailure::Network { .. } => RetryDecision::Retry(self.base_backoff),
        }
    }
}
