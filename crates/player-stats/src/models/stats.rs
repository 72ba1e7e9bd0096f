use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::handle::PlayerHandle;
use super::types::ProviderId;

/// Normalized player statistics, identical in shape for every provider.
///
/// All numeric fields are non-negative. Fields a provider does not report
/// are 0. `kd_ratio` is whatever the provider reported; it is never derived
/// from `kills` and `deaths` for real providers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalStatsRecord {
    /// The handle the caller asked for (discriminator retained).
    pub handle: PlayerHandle,

    pub kills: u64,
    pub deaths: u64,
    pub kd_ratio: f64,
    pub wins: u64,
    pub top10: u64,
    pub games_played: u64,
    pub score_per_minute: f64,
    pub damage_done: u64,
    pub damage_taken: u64,
    pub headshots: u64,

    /// Longest kill distance, in the provider's unit (meters for all known providers).
    pub longest_shot: f64,
    pub revives: u64,
    pub time_played_seconds: u64,

    /// Average life time in seconds.
    pub avg_life_time: f64,

    /// Provider that produced the record (SYNTHETIC for generated records).
    pub source_provider_id: ProviderId,

    /// True when the numbers were invented because no provider answered.
    pub is_synthetic: bool,

    pub fetched_at: DateTime<Utc>,
}

impl CanonicalStatsRecord {
    /// A record with every numeric field set to 0.
    pub fn zeroed(handle: PlayerHandle, source_provider_id: ProviderId) -> Self {
        Self {
            handle,
            kills: 0,
            deaths: 0,
            kd_ratio: 0.0,
            wins: 0,
            top10: 0,
            games_played: 0,
            score_per_minute: 0.0,
            damage_done: 0,
            damage_taken: 0,
            headshots: 0,
            longest_shot: 0.0,
            revives: 0,
            time_played_seconds: 0,
            avg_life_time: 0.0,
            source_provider_id,
            is_synthetic: false,
            fetched_at: Utc::now(),
        }
    }
}
