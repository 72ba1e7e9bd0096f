use std::sync::Arc;

use statline_player_stats::{
    catalog, EngineConfig, EngineError, ProviderConfig, ProviderRegistry, ReqwestTransport,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Resolve the configured provider ids into built-in configurations.
///
/// `RAPIDAPI_COD` is skipped when no API key is set. Unknown ids are an error.
pub fn provider_configs(config: &Config) -> Result<Vec<ProviderConfig>, EngineError> {
    let mut configs = Vec::with_capacity(config.providers.len());

    for id in &config.providers {
        match catalog::builtin(id, config.rapidapi_key.as_deref()) {
            Some(provider) => configs.push(provider),
            None if id == catalog::RAPIDAPI_COD => {
                tracing::warn!("STATLINE_RAPIDAPI_KEY not set, skipping {}", id);
            }
            None => return Err(EngineError::UnknownProvider(id.clone())),
        }
    }

    Ok(configs)
}

pub fn build_registry(config: &Config) -> anyhow::Result<ProviderRegistry> {
    let providers = provider_configs(config)?;

    // Providers are tried in the order STATLINE_PROVIDERS lists them
    let engine_config = EngineConfig::default()
        .with_fallback_mode(config.fallback_mode)
        .with_pacing_delay(config.pacing_delay)
        .with_request_timeout(config.request_timeout);

    let registry = ProviderRegistry::from_configs(
        &engine_config,
        providers,
        Arc::new(ReqwestTransport::new()),
    )?;

    tracing::info!(
        "Engine ready with providers [{}], fallback mode {}",
        registry
            .providers()
            .iter()
            .map(|p| p.id().to_string())
            .collect::<Vec<_>>()
            .join(", "),
        engine_config.fallback_mode
    );

    Ok(registry)
}
