//! Synthetic stats generator.
//!
//! Last resort when every provider failed: produces a plausible-looking record
//! so downstream formatting keeps working. Values are random; only their
//! relationships are constrained (deaths track kills, wins are a small share
//! of kills, top 10s are a multiple of wins). Every generated record carries
//! `is_synthetic = true`.

use std::borrow::Cow;

use rand::Rng;

use crate::models::{CanonicalStatsRecord, PlayerHandle, ProviderId};

/// `source_provider_id` of generated records.
pub const SYNTHETIC_PROVIDER_ID: &str = "SYNTHETIC";

#[derive(Clone, Copy, Debug, Default)]
pub struct SyntheticGenerator;

impl SyntheticGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn provider_id() -> ProviderId {
        Cow::Borrowed(SYNTHETIC_PROVIDER_ID)
    }

    /// Generate a record using the thread-local RNG.
    pub fn generate(&self, handle: &PlayerHandle) -> CanonicalStatsRecord {
        self.generate_with_rng(handle, &mut rand::thread_rng())
    }

    /// Generate a record from the given RNG. Longer names get more kills.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        handle: &PlayerHandle,
        rng: &mut R,
    ) -> CanonicalStatsRecord {
        let base = handle.name.chars().count() as u64 * 100;
        let kills = base + rng.gen_range(500..=2000u64);
        let deaths = scale(kills, rng.gen_range(0.8..=1.2)).max(1);
        let wins = scale(kills, rng.gen_range(0.05..=0.15));

        let mut record = CanonicalStatsRecord::zeroed(handle.clone(), Self::provider_id());
        record.kills = kills;
        record.deaths = deaths;
        record.kd_ratio = round2(kills as f64 / deaths as f64);
        record.wins = wins;
        record.top10 = scale(wins, rng.gen_range(2.0..=4.0));
        record.games_played = scale(kills, rng.gen_range(0.3..=0.6));
        record.score_per_minute = round2(rng.gen_range(200.0..=500.0));
        record.damage_done = scale(kills, rng.gen_range(800.0..=1200.0));
        record.damage_taken = scale(deaths, rng.gen_range(600.0..=1000.0));
        record.headshots = scale(kills, rng.gen_range(0.1..=0.3));
        record.longest_shot = round2(rng.gen_range(50.0..=300.0));
        record.revives = rng.gen_range(0..=50);
        record.time_played_seconds = rng.gen_range(3600..=72000);
        record.avg_life_time = round2(rng.gen_range(300.0..=900.0));
        record.is_synthetic = true;
        record
    }
}

fn scale(value: u64, factor: f64) -> u64 {
    (value as f64 * factor) as u64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
