//! Response normalization.
//!
//! Providers nest their numbers differently:
//! - [`ResponseShape::FlatStats`]: `{"stats": {"kills": 1, ...}}`
//! - [`ResponseShape::NestedDataStats`]: `{"data": {"stats": {"kills": 1, ...}}}`
//! - [`ResponseShape::KeyValueList`]: `{"data": {"stats": [{"metadata": {"key": "kills"}, "value": 1}, ...]}}`
//!
//! A missing root key is a malformed response. Missing or non-numeric stat
//! fields are not: they become 0.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::FetchError;
use crate::models::{CanonicalStatsRecord, PlayerHandle, ProviderId};

/// JSON layout of a provider's success body.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    FlatStats,
    NestedDataStats,
    KeyValueList,
}

/// Where the stat values live inside a body.
enum StatSource<'a> {
    Object(&'a Map<String, Value>),
    Pairs(&'a [Value]),
}

impl StatSource<'_> {
    fn number(&self, key: &str) -> f64 {
        match self {
            Self::Object(map) => map.get(key).map(coerce).unwrap_or(0.0),
            Self::Pairs(pairs) => pairs
                .iter()
                .find(|pair| pair.pointer("/metadata/key").and_then(Value::as_str) == Some(key))
                .and_then(|pair| pair.get("value"))
                .map(coerce)
                .unwrap_or(0.0),
        }
    }

    fn count(&self, key: &str) -> u64 {
        // Truncation is intended: counts come back as 1234.0 from some providers
        self.number(key) as u64
    }
}

/// Permissive numeric coercion.
///
/// Numbers and numeric strings are accepted; `{"value": n}` wrappers are
/// unwrapped. Anything else, negatives and non-finite values become 0.
fn coerce(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        Value::Object(map) => map.get("value").map(coerce),
        _ => None,
    };

    match raw {
        Some(n) if n.is_finite() && n > 0.0 => n,
        _ => 0.0,
    }
}

fn locate(raw: &Value, shape: ResponseShape) -> Result<StatSource<'_>, FetchError> {
    let stats = match shape {
        ResponseShape::FlatStats => raw
            .get("stats")
            .ok_or_else(|| FetchError::malformed("missing 'stats'"))?,
        ResponseShape::NestedDataStats | ResponseShape::KeyValueList => raw
            .get("data")
            .ok_or_else(|| FetchError::malformed("missing 'data'"))?
            .get("stats")
            .ok_or_else(|| FetchError::malformed("missing 'data.stats'"))?,
    };

    match stats {
        Value::Object(map) => Ok(StatSource::Object(map)),
        Value::Array(pairs) if shape == ResponseShape::KeyValueList => {
            Ok(StatSource::Pairs(pairs.as_slice()))
        }
        other => Err(FetchError::malformed(format!(
            "unexpected stats type: {}",
            json_type(other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Map a provider body onto the canonical record.
pub fn normalize(
    raw: &Value,
    shape: ResponseShape,
    handle: &PlayerHandle,
    provider_id: &ProviderId,
) -> Result<CanonicalStatsRecord, FetchError> {
    let stats = locate(raw, shape)?;

    let mut record = CanonicalStatsRecord::zeroed(handle.clone(), provider_id.clone());
    record.kills = stats.count("kills");
    record.deaths = stats.count("deaths");
    record.kd_ratio = stats.number("kdRatio");
    record.wins = stats.count("wins");
    record.top10 = stats.count("top10");
    record.games_played = stats.count("gamesPlayed");
    record.score_per_minute = stats.number("scorePerMinute");
    record.damage_done = stats.count("damageDone");
    record.damage_taken = stats.count("damageTaken");
    record.headshots = stats.count("headshots");
    record.longest_shot = stats.number("longestShot");
    record.revives = stats.count("revives");
    record.time_played_seconds = stats.count("timePlayed");
    record.avg_life_time = stats.number("avgLifeTime");

    Ok(record)
}

/// Parse a body and normalize it.
pub fn normalize_body(
    body: &str,
    shape: ResponseShape,
    handle: &PlayerHandle,
    provider_id: &ProviderId,
) -> Result<CanonicalStatsRecord, FetchError> {
    let raw: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::malformed(format!("invalid JSON: {}", e)))?;
    normalize(&raw, shape, handle, provider_id)
}
