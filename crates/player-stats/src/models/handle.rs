use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// Gaming platform a player account lives on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Battlenet,
    Psn,
    Xbl,
    Steam,
    Uno,
}

impl Platform {
    /// Canonical lowercase name, as accepted by [`normalize_platform`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Battlenet => "battlenet",
            Self::Psn => "psn",
            Self::Xbl => "xbl",
            Self::Steam => "steam",
            Self::Uno => "uno",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize_platform(s).ok_or_else(|| EngineError::UnknownPlatform(s.to_string()))
    }
}

/// Map a user-supplied platform name onto a [`Platform`].
///
/// Matching is case-insensitive and ignores surrounding whitespace.
/// `battle` is accepted as an alias of `battlenet`.
pub fn normalize_platform(raw: &str) -> Option<Platform> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "battlenet" | "battle" => Some(Platform::Battlenet),
        "psn" => Some(Platform::Psn),
        "xbl" => Some(Platform::Xbl),
        "steam" => Some(Platform::Steam),
        "uno" => Some(Platform::Uno),
        _ => None,
    }
}

/// Drop a `#tag` discriminator suffix from a player name.
///
/// Names without a discriminator are returned unchanged, so applying this
/// twice is the same as applying it once.
pub fn strip_discriminator(name: &str) -> &str {
    match name.split_once('#') {
        Some((base, _)) => base,
        None => name,
    }
}

/// A (player name, platform) pair identifying whose stats to fetch.
///
/// Two handles are equal when their names match exactly and their platforms
/// normalise to the same [`Platform`].
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct PlayerHandle {
    /// Player name as given by the caller, possibly with a `#tag` suffix.
    pub name: String,
    pub platform: Platform,
}

impl PlayerHandle {
    pub fn new(name: impl Into<String>, platform: Platform) -> Self {
        Self {
            name: name.into(),
            platform,
        }
    }

    /// Build a handle from a raw platform name such as `"battle"` or `"PSN"`.
    pub fn parse(name: impl Into<String>, platform: &str) -> Result<Self, EngineError> {
        Ok(Self::new(name, platform.parse()?))
    }

    /// The `#tag` part of the name, if any.
    pub fn discriminator(&self) -> Option<&str> {
        self.name
            .split_once('#')
            .map(|(_, tag)| tag)
            .filter(|tag| !tag.is_empty())
    }

    /// The name with any discriminator removed.
    pub fn base_name(&self) -> &str {
        strip_discriminator(&self.name)
    }
}

impl fmt::Display for PlayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.platform)
    }
}
