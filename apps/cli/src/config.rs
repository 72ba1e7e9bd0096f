use std::time::Duration;

use anyhow::{anyhow, Context};
use statline_player_stats::{catalog, FallbackMode, DEFAULT_PACING_DELAY, DEFAULT_REQUEST_TIMEOUT};

pub struct Config {
    pub rapidapi_key: Option<String>,
    pub providers: Vec<String>,
    pub fallback_mode: FallbackMode,
    pub pacing_delay: Duration,
    pub request_timeout: Duration,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rapidapi_key = lookup("STATLINE_RAPIDAPI_KEY").filter(|k| !k.trim().is_empty());

        let providers = match lookup("STATLINE_PROVIDERS") {
            Some(list) => parse_list(&list),
            None => catalog::DEFAULT_PRIORITY.iter().map(|s| s.to_string()).collect(),
        };

        let fallback_mode = match lookup("STATLINE_FALLBACK_MODE") {
            Some(mode) => mode.parse().map_err(|e: String| anyhow!(e))?,
            None => FallbackMode::default(),
        };

        let pacing_delay = match lookup("STATLINE_PACING_MS") {
            Some(ms) => Duration::from_millis(
                ms.trim()
                    .parse()
                    .with_context(|| format!("Invalid STATLINE_PACING_MS: {}", ms))?,
            ),
            None => DEFAULT_PACING_DELAY,
        };

        let request_timeout = match lookup("STATLINE_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.trim()
                    .parse()
                    .with_context(|| format!("Invalid STATLINE_TIMEOUT_SECS: {}", secs))?,
            ),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let log_format = lookup("STATLINE_LOG_FORMAT").unwrap_or_else(|| "text".into());

        Ok(Self {
            rapidapi_key,
            providers,
            fallback_mode,
            pacing_delay,
            request_timeout,
            log_format,
        })
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
