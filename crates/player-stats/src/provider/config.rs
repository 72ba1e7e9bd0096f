//! Static per-provider configuration.
//!
//! A [`ProviderConfig`] describes everything that differs between providers:
//! where to send the request, which headers to attach, how to spell the
//! platform and the player name, how fast we may call it, how to retry and
//! which response shape to expect. It is immutable once the engine is built.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{EngineError, RetryPolicy};
use crate::models::{Platform, PlayerHandle, ProviderId};
use crate::registry::RateLimitConfig;

use super::normalize::ResponseShape;

/// Rate-limit penalty used when a provider does not configure its own.
const DEFAULT_RATE_LIMIT_PENALTY_SECS: u64 = 30;

/// How a provider wants the `#tag` discriminator of a player name.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscriminatorPolicy {
    /// Send the name without its discriminator.
    Strip,
    /// Send the name exactly as given.
    Keep,
    /// Send the name as given, but Battle.net names must carry a discriminator.
    RequireForBattlenet,
}

/// Static per-provider descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Unique identifier, e.g. "RAPIDAPI_COD".
    pub id: ProviderId,

    /// Scheme and host, without a trailing slash.
    pub base_url: String,

    /// Path template with `{username}` and `{platform}` placeholders.
    pub endpoint_template: String,

    /// Headers attached to every request.
    pub default_headers: BTreeMap<String, String>,

    /// Provider spelling of each platform. Missing entries use the canonical name.
    pub platform_alias_map: BTreeMap<Platform, String>,

    /// Platforms the provider can look up. Empty means all of them.
    #[serde(default)]
    pub supported_platforms: BTreeSet<Platform>,

    /// Shape of a successful response body.
    pub response_shape: ResponseShape,

    pub discriminator: DiscriminatorPolicy,

    pub max_requests_per_window: u32,
    pub window_seconds: u64,

    /// Budgeted HTTP attempts per fetch (429 penalties excluded).
    pub max_retry_attempts: u32,
    pub base_backoff_seconds: u64,
    pub rate_limit_penalty_seconds: u64,

    /// User agents rotated in on retries. Empty means never rotate.
    #[serde(default)]
    pub user_agents: Vec<String>,
}

impl ProviderConfig {
    /// Create a configuration with conservative defaults:
    /// 10 requests per minute, 2 attempts, 2 second backoff.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        base_url: impl Into<String>,
        endpoint_template: impl Into<String>,
        response_shape: ResponseShape,
    ) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            endpoint_template: endpoint_template.into(),
            default_headers: BTreeMap::new(),
            platform_alias_map: BTreeMap::new(),
            supported_platforms: BTreeSet::new(),
            response_shape,
            discriminator: DiscriminatorPolicy::Strip,
            max_requests_per_window: 10,
            window_seconds: 60,
            max_retry_attempts: 2,
            base_backoff_seconds: 2,
            rate_limit_penalty_seconds: DEFAULT_RATE_LIMIT_PENALTY_SECS,
            user_agents: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_platform_alias(mut self, platform: Platform, alias: impl Into<String>) -> Self {
        self.platform_alias_map.insert(platform, alias.into());
        self
    }

    pub fn with_supported_platforms<I>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = Platform>,
    {
        self.supported_platforms = platforms.into_iter().collect();
        self
    }

    pub fn supports(&self, platform: Platform) -> bool {
        self.supported_platforms.is_empty() || self.supported_platforms.contains(&platform)
    }

    pub fn with_discriminator(mut self, policy: DiscriminatorPolicy) -> Self {
        self.discriminator = policy;
        self
    }

    pub fn with_rate_limit(mut self, max_requests: u32, window_seconds: u64) -> Self {
        self.max_requests_per_window = max_requests;
        self.window_seconds = window_seconds;
        self
    }

    pub fn with_retry(mut self, max_attempts: u32, base_backoff_seconds: u64) -> Self {
        self.max_retry_attempts = max_attempts;
        self.base_backoff_seconds = base_backoff_seconds;
        self
    }

    pub fn with_rate_limit_penalty(mut self, seconds: u64) -> Self {
        self.rate_limit_penalty_seconds = seconds;
        self
    }

    pub fn with_user_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_agents = agents.into_iter().map(Into::into).collect();
        self
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |message: &str| EngineError::InvalidConfig {
            provider: self.id.to_string(),
            message: message.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id must not be empty"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(invalid("base_url must be an http(s) URL"));
        }
        if !self.endpoint_template.contains("{username}") {
            return Err(invalid("endpoint_template must contain {username}"));
        }
        if self.max_requests_per_window == 0 {
            return Err(invalid("max_requests_per_window must be positive"));
        }
        if self.window_seconds == 0 {
            return Err(invalid("window_seconds must be positive"));
        }
        if self.max_retry_attempts == 0 {
            return Err(invalid("max_retry_attempts must be positive"));
        }
        Ok(())
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            max_requests: self.max_requests_per_window,
            window: Duration::from_secs(self.window_seconds),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retry_attempts,
            Duration::from_secs(self.base_backoff_seconds),
            Duration::from_secs(self.rate_limit_penalty_seconds),
        )
    }

    /// Provider spelling of a platform.
    pub fn api_platform(&self, platform: Platform) -> &str {
        self.platform_alias_map
            .get(&platform)
            .map(String::as_str)
            .unwrap_or_else(|| platform.as_str())
    }

    /// The player name to send, after applying the discriminator policy.
    ///
    /// Returns `None` when the provider cannot serve this handle at all.
    pub fn request_name<'a>(&self, handle: &'a PlayerHandle) -> Option<&'a str> {
        match self.discriminator {
            DiscriminatorPolicy::Strip => Some(handle.base_name()),
            DiscriminatorPolicy::Keep => Some(handle.name.as_str()),
            DiscriminatorPolicy::RequireForBattlenet => {
                if handle.platform == Platform::Battlenet && handle.discriminator().is_none() {
                    None
                } else {
                    Some(handle.name.as_str())
                }
            }
        }
    }

    /// Build the full request URL for a handle.
    ///
    /// Returns `None` when the provider cannot look up the handle's platform
    /// or its discriminator policy rejects the handle.
    pub fn build_url(&self, handle: &PlayerHandle) -> Option<String> {
        if !self.supports(handle.platform) {
            return None;
        }
        let name = self.request_name(handle)?;
        let path = self
            .endpoint_template
            .replace("{username}", &urlencoding::encode(name))
            .replace("{platform}", self.api_platform(handle.platform));
        Some(format!("{}{}", self.base_url, path))
    }

    /// Headers for the given 1-based attempt, rotating the user agent on retries.
    pub fn headers_for_attempt(&self, attempt: u32) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = self
            .default_headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        if attempt > 1 && !self.user_agents.is_empty() {
            let agent = &self.user_agents[(attempt as usize - 2) % self.user_agents.len()];
            headers.retain(|(name, _)| !name.eq_ignore_ascii_case("user-agent"));
            headers.push(("User-Agent".to_string(), agent.clone()));
        }

        headers
    }
}
