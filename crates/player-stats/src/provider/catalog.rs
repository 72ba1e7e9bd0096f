//! Built-in provider configurations.
//!
//! Limits and backoffs are tuned per provider: RapidAPI tolerates the most
//! traffic, tracker.gg the least (it bans aggressively).

use crate::models::Platform;

use super::config::{DiscriminatorPolicy, ProviderConfig};
use super::normalize::ResponseShape;

pub const RAPIDAPI_COD: &str = "RAPIDAPI_COD";
pub const COD_API_HUB: &str = "COD_API_HUB";
pub const TRACKER_GG: &str = "TRACKER_GG";

/// Default fallback order.
pub const DEFAULT_PRIORITY: [&str; 3] = [RAPIDAPI_COD, COD_API_HUB, TRACKER_GG];

const RAPIDAPI_HOST: &str = "call-of-duty-modern-warfare.p.rapidapi.com";

const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const CHROME_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const CHROME_LINUX: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// RapidAPI "Call of Duty Modern Warfare" API. Requires an API key.
pub fn rapidapi_cod(api_key: &str) -> ProviderConfig {
    ProviderConfig::new(
        RAPIDAPI_COD,
        format!("https://{}", RAPIDAPI_HOST),
        "/warzone/{username}/{platform}",
        ResponseShape::FlatStats,
    )
    .with_header("X-RapidAPI-Key", api_key)
    .with_header("X-RapidAPI-Host", RAPIDAPI_HOST)
    .with_platform_alias(Platform::Battlenet, "battle")
    .with_discriminator(DiscriminatorPolicy::Strip)
    .with_rate_limit(30, 60)
    .with_retry(3, 2)
}

/// cod-api.uno community mirror. Scraped, so it gets browser-like headers.
pub fn cod_api_hub() -> ProviderConfig {
    ProviderConfig::new(
        COD_API_HUB,
        "https://cod-api.uno",
        "/stats/cod/v1/mw/warzone/{username}/{platform}",
        ResponseShape::NestedDataStats,
    )
    .with_header("User-Agent", CHROME_WINDOWS)
    .with_header("Accept", "application/json")
    .with_header("Accept-Language", "en-US,en;q=0.9")
    .with_platform_alias(Platform::Battlenet, "battle")
    .with_discriminator(DiscriminatorPolicy::Strip)
    .with_rate_limit(15, 60)
    .with_retry(3, 3)
    .with_rate_limit_penalty(30)
}

/// tracker.gg profile API. Only Battle.net, PSN and Xbox profiles are
/// searchable, and Battle.net lookups need the full `name#1234`.
pub fn tracker_gg() -> ProviderConfig {
    ProviderConfig::new(
        TRACKER_GG,
        "https://api.tracker.gg",
        "/api/v2/warzone/standard/profile/{platform}/{username}",
        ResponseShape::KeyValueList,
    )
    .with_header("User-Agent", CHROME_WINDOWS)
    .with_header("Accept", "application/json, text/plain, */*")
    .with_header("Accept-Language", "en-US,en;q=0.9")
    .with_header("Cache-Control", "no-cache")
    .with_header("Referer", "https://tracker.gg/")
    .with_supported_platforms([Platform::Battlenet, Platform::Psn, Platform::Xbl])
    .with_discriminator(DiscriminatorPolicy::RequireForBattlenet)
    .with_rate_limit(3, 60)
    .with_retry(2, 10)
    .with_rate_limit_penalty(60)
    .with_user_agents([CHROME_MAC, CHROME_LINUX, CHROME_WINDOWS])
}

/// Look up a built-in configuration by id.
///
/// Returns `None` for unknown ids, and for `RAPIDAPI_COD` when no API key is
/// available.
pub fn builtin(id: &str, rapidapi_key: Option<&str>) -> Option<ProviderConfig> {
    match id {
        RAPIDAPI_COD => rapidapi_key.map(rapidapi_cod),
        COD_API_HUB => Some(cod_api_hub()),
        TRACKER_GG => Some(tracker_gg()),
        _ => None,
    }
}
