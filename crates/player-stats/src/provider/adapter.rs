//! HTTP provider adapter.
//!
//! One [`HttpStatsProvider`] exists per [`ProviderConfig`]. It owns the
//! request loop: rate-limit admission, the GET itself, retry classification
//! and, on success, normalization of the body.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::errors::{AttemptFailure, FetchError, FetchOutcome, RetryDecision, RetryPolicy};
use crate::models::{PlayerHandle, ProviderId};
use crate::registry::RateLimiter;

use super::config::ProviderConfig;
use super::normalize::normalize_body;
use super::traits::StatsProvider;
use super::transport::{HttpRequest, HttpTransport, TransportError};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Generic HTTP-backed stats provider.
pub struct HttpStatsProvider {
    config: ProviderConfig,
    policy: RetryPolicy,
    transport: Arc<dyn HttpTransport>,
    rate_limiter: Arc<RateLimiter>,
    request_timeout: Duration,
}

impl HttpStatsProvider {
    /// Create an adapter. The provider's limits are registered with the
    /// shared rate limiter here.
    pub fn new(
        config: ProviderConfig,
        transport: Arc<dyn HttpTransport>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        rate_limiter.configure(&config.id, config.rate_limit());
        let policy = config.retry_policy();

        Self {
            config,
            policy,
            transport,
            rate_limiter,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Issue one rate-limited request and turn it into a success body or a failure.
    async fn attempt(&self, url: &str, attempt: u32) -> Result<String, AttemptFailure> {
        self.rate_limiter.acquire(&self.config.id).await;

        debug!(
            "{} request (attempt {}/{}): {}",
            self.config.id,
            attempt,
            self.policy.max_attempts(),
            url
        );

        let request = HttpRequest {
            url: url.to_string(),
            headers: self.config.headers_for_attempt(attempt),
            timeout: self.request_timeout,
        };

        match self.transport.get(request).await {
            Ok(response) if response.is_success() => Ok(response.body),
            Ok(response) => Err(AttemptFailure::Status {
                status: response.status,
                retry_after: response.retry_after,
            }),
            Err(TransportError::Timeout) => Err(AttemptFailure::Network {
                message: format!("timed out after {:?}", self.request_timeout),
            }),
            Err(TransportError::Connection(message)) => Err(AttemptFailure::Network { message }),
        }
    }
}

#[async_trait]
impl StatsProvider for HttpStatsProvider {
    fn id(&self) -> ProviderId {
        self.config.id.clone()
    }

    async fn fetch(&self, handle: &PlayerHandle) -> FetchOutcome {
        let Some(url) = self.config.build_url(handle) else {
            debug!("{} cannot look up {}, skipping", self.config.id, handle);
            return Err(FetchError::NotFound);
        };

        let mut attempt: u32 = 1;
        let mut penalties_taken: u32 = 0;

        loop {
            let failure = match self.attempt(&url, attempt).await {
                Ok(body) => {
                    let record = normalize_body(
                        &body,
                        self.config.response_shape,
                        handle,
                        &self.config.id,
                    )?;
                    info!("{} returned stats for {}", self.config.id, handle);
                    return Ok(record);
                }
                Err(failure) => failure,
            };

            match self.policy.classify(&failure, attempt, penalties_taken) {
                RetryDecision::Abort(error) => {
                    debug!("{} giving up on {}: {}", self.config.id, handle, error);
                    return Err(error);
                }
                RetryDecision::Retry(delay) => {
                    warn!(
                        "{} attempt {} failed ({:?}), retrying in {:?}",
                        self.config.id, attempt, failure, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::RetryAfterPenalty(penalty) => {
                    warn!(
                        "{} rate limited us, waiting {:?} before retrying",
                        self.config.id, penalty
                    );
                    tokio::time::sleep(penalty).await;
                    penalties_taken += 1;
                }
            }
        }
    }
}
