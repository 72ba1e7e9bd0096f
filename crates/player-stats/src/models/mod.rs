//! Player statistics models
//!
//! This module contains the core data types shared by every provider:
//! - `types` - Type aliases for common identifiers (ProviderId)
//! - `handle` - Player identity (PlayerHandle) and the Platform enum
//! - `stats` - The canonical, provider-agnostic stats record

mod handle;
mod stats;
mod types;

pub use handle::{normalize_platform, strip_discriminator, Platform, PlayerHandle};
pub use stats::CanonicalStatsRecord;
pub use types::ProviderId;
