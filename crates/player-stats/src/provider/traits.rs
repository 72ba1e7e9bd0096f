//! Stats provider trait definition.

use async_trait::async_trait;

use crate::errors::FetchOutcome;
use crate::models::{PlayerHandle, ProviderId};

/// A source of player statistics.
///
/// The registry calls providers strictly one at a time, in its configured
/// priority order, and stops at the first success.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use statline_player_stats::{FetchOutcome, PlayerHandle, ProviderId, StatsProvider};
///
/// struct FixtureProvider;
///
/// #[async_trait]
/// impl StatsProvider for FixtureProvider {
///     fn id(&self) -> ProviderId {
///         "FIXTURE".into()
///     }
///
///     async fn fetch(&self, handle: &PlayerHandle) -> FetchOutcome {
///         Err(FetchError::NotFound)
///     }
/// }
/// ```
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Used for logging, rate limiting and as the record's `source_provider_id`.
    fn id(&self) -> ProviderId;

    /// Fetch and normalize stats for one player.
    ///
    /// Implementations own their retries; a returned error is final for this
    /// provider and this fetch.
    async fn fetch(&self, handle: &PlayerHandle) -> FetchOutcome;
}
