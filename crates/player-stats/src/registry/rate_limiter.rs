//! Sliding window rate limiter for stats providers.
//!
//! Each provider keeps the timestamps of its admitted requests within the
//! trailing window. A request is admitted while fewer than
//! `max_requests` timestamps remain after evicting the expired ones;
//! otherwise the caller is told how long to wait for the oldest one to
//! leave the window. Requests are only ever delayed, never dropped.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;

use crate::models::ProviderId;

/// Default rate limit: 60 requests per minute.
const DEFAULT_MAX_REQUESTS: u32 = 60;

const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Rate limiter configuration for a provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum admitted requests within any trailing window.
    pub max_requests: u32,
    /// Length of the trailing window.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_MAX_REQUESTS,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Result of an admission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// The request was recorded and may go out now.
    Proceed,
    /// Nothing was recorded; ask again after this long.
    Wait(Duration),
}

/// Admission timestamps for a single provider.
#[derive(Debug)]
struct SlidingWindow {
    timestamps: VecDeque<Instant>,
    config: RateLimitConfig,
}

impl SlidingWindow {
    fn new(config: RateLimitConfig) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(config.max_requests as usize),
            config,
        }
    }

    /// Drop timestamps that are at least one window old.
    fn evict(&mut self, now: Instant) {
        while let Some(oldest) = self.timestamps.front() {
            if now.duration_since(*oldest) >= self.config.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    fn try_admit(&mut self, now: Instant) -> Admission {
        self.evict(now);

        if (self.timestamps.len() as u32) < self.config.max_requests {
            self.timestamps.push_back(now);
            return Admission::Proceed;
        }

        match self.timestamps.front() {
            Some(oldest) => {
                Admission::Wait(self.config.window.saturating_sub(now.duration_since(*oldest)))
            }
            // max_requests == 0; validated away by the registry, but never spin.
            None => Admission::Wait(self.config.window),
        }
    }
}

/// Sliding window rate limiter for multiple providers.
///
/// Thread-safe: the evict/count/append sequence for a provider happens under
/// a single lock, so concurrent fetches never over-admit. One instance is
/// shared by every adapter for the lifetime of the process.
pub struct RateLimiter {
    /// Per-provider admission windows.
    windows: Mutex<HashMap<String, SlidingWindow>>,
    /// Per-provider configuration overrides.
    configs: Mutex<HashMap<String, RateLimitConfig>>,
}

impl RateLimiter {
    /// Create a new rate limiter with default settings.
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            configs: Mutex::new(HashMap::new()),
        }
    }

    /// Lock the windows mutex, recovering from poison if necessary.
    ///
    /// A poisoned window only means one admission may have been lost,
    /// which is better than panicking every later fetch.
    fn lock_windows(&self) -> MutexGuard<'_, HashMap<String, SlidingWindow>> {
        self.windows.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter windows mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Lock the configs mutex, recovering from poison if necessary.
    fn lock_configs(&self) -> MutexGuard<'_, HashMap<String, RateLimitConfig>> {
        self.configs.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter configs mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Configure rate limits for a specific provider.
    pub fn configure(&self, provider: &ProviderId, config: RateLimitConfig) {
        let mut configs = self.lock_configs();
        configs.insert(provider.to_string(), config);
        drop(configs); // Release configs lock before acquiring windows lock

        // Start from an empty window under the new limits
        let mut windows = self.lock_windows();
        windows.remove(provider.as_ref());
    }

    /// Check admission for the given provider without waiting.
    ///
    /// On [`Admission::Proceed`] the request has been recorded.
    pub fn admit(&self, provider: &ProviderId) -> Admission {
        let now = Instant::now();
        let mut windows = self.lock_windows();

        let window = windows
            .entry(provider.to_string())
            .or_insert_with(|| self.create_window(provider));

        window.try_admit(now)
    }

    /// Wait (asynchronously) until the provider admits a request.
    pub async fn acquire(&self, provider: &ProviderId) {
        loop {
            match self.admit(provider) {
                Admission::Proceed => {
                    debug!("Rate limiter: admitted request for '{}'", provider);
                    return;
                }
                Admission::Wait(wait_time) => {
                    debug!(
                        "Rate limiter: waiting {:?} for provider '{}'",
                        wait_time, provider
                    );
                    tokio::time::sleep(wait_time).await;
                }
            }
        }
    }

    /// Number of admitted requests still inside the provider's window.
    pub fn in_window(&self, provider: &ProviderId) -> usize {
        let now = Instant::now();
        let mut windows = self.lock_windows();

        match windows.get_mut(provider.as_ref()) {
            Some(window) => {
                window.evict(now);
                window.timestamps.len()
            }
            None => 0,
        }
    }

    /// Create a window for a provider, using custom config if available.
    fn create_window(&self, provider: &ProviderId) -> SlidingWindow {
        let configs = self.lock_configs();

        match configs.get(provider.as_ref()) {
            Some(config) => SlidingWindow::new(config.clone()),
            None => {
                debug!(
                    "Rate limiter: no limits configured for '{}', using defaults",
                    provider
                );
                SlidingWindow::new(RateLimitConfig::default())
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
