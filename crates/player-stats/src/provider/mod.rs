//! Stats provider abstractions and implementations.
//!
//! This module contains:
//! - The `StatsProvider` trait that every source implements
//! - `ProviderConfig`, the static descriptor of an HTTP provider
//! - `HttpStatsProvider`, one generic adapter driven entirely by a config
//! - The built-in provider catalog
//! - The HTTP transport seam and response normalization
//!
//! # Architecture
//!
//! Providers differ only in data: URL template, headers, platform spelling,
//! discriminator handling, limits and response shape. Adding a provider means
//! adding a `ProviderConfig`, not a new type. Code that needs a completely
//! different source (a fixture, a cache) implements `StatsProvider` directly.

mod adapter;
mod config;
mod normalize;
mod traits;
mod transport;

pub mod catalog;

// Re-exports
pub use adapter::{HttpStatsProvider, DEFAULT_REQUEST_TIMEOUT};
pub use config::{DiscriminatorPolicy, ProviderConfig};
pub use normalize::{normalize, normalize_body, ResponseShape};
pub use traits::StatsProvider;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
