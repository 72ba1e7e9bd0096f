//! Provider registry for orchestrating stats providers.
//!
//! The registry owns the ordered provider list and handles:
//! - Sequential fallback in a fixed priority order
//! - Pacing between providers within one fetch
//! - Strict or synthetic behaviour once every provider failed

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use super::{FetchDiagnostics, RateLimiter};
use crate::config::{EngineConfig, FallbackMode};
use crate::errors::EngineError;
use crate::models::{CanonicalStatsRecord, PlayerHandle, ProviderId};
use crate::provider::{HttpStatsProvider, HttpTransport, ProviderConfig, StatsProvider};
use crate::synthetic::SyntheticGenerator;

/// Provider registry for orchestrating stats fetching.
///
/// Safe to share between tasks (`Arc<ProviderRegistry>`). The registry itself
/// is immutable; rate-limit state lives with the providers.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn StatsProvider>>,
    fallback_mode: FallbackMode,
    pacing_delay: Duration,
    synthetic: SyntheticGenerator,
}

impl ProviderRegistry {
    /// Create a registry from ready-made providers.
    ///
    /// Providers are ordered by `config.priority`; providers it does not name
    /// are left out. An empty priority list keeps the given order.
    pub fn new(
        providers: Vec<Arc<dyn StatsProvider>>,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let providers = order_providers(providers, &config.priority)?;
        if providers.is_empty() {
            return Err(EngineError::NoProvidersConfigured);
        }

        debug!(
            "Provider registry ready: [{}], fallback mode {}",
            providers
                .iter()
                .map(|p| p.id().to_string())
                .collect::<Vec<_>>()
                .join(", "),
            config.fallback_mode
        );

        Ok(Self {
            providers,
            fallback_mode: config.fallback_mode,
            pacing_delay: config.pacing_delay,
            synthetic: SyntheticGenerator::new(),
        })
    }

    /// Build HTTP adapters for the given provider configurations.
    ///
    /// Every configuration is validated and all adapters share one rate
    /// limiter and one transport.
    pub fn from_configs(
        config: &EngineConfig,
        provider_configs: Vec<ProviderConfig>,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, EngineError> {
        let rate_limiter = Arc::new(RateLimiter::new());
        let mut providers: Vec<Arc<dyn StatsProvider>> = Vec::with_capacity(provider_configs.len());

        for provider_config in provider_configs {
            provider_config.validate()?;
            let adapter =
                HttpStatsProvider::new(provider_config, transport.clone(), rate_limiter.clone())
                    .with_request_timeout(config.request_timeout);
            providers.push(Arc::new(adapter));
        }

        Self::new(providers, config)
    }

    /// Providers in the order they are tried.
    pub fn providers(&self) -> &[Arc<dyn StatsProvider>] {
        &self.providers
    }

    /// Fetch stats for a player.
    ///
    /// Returns the first provider's successful record. When every provider
    /// fails, returns `None` in strict mode or a synthetic record otherwise.
    pub async fn fetch_player_stats(&self, handle: &PlayerHandle) -> Option<CanonicalStatsRecord> {
        self.fetch_with_diagnostics(handle).await.0
    }

    /// Fetch stats and report what every provider did.
    pub async fn fetch_with_diagnostics(
        &self,
        handle: &PlayerHandle,
    ) -> (Option<CanonicalStatsRecord>, FetchDiagnostics) {
        let mut diagnostics = FetchDiagnostics::new();

        for (index, provider) in self.providers.iter().enumerate() {
            let provider_id = provider.id();

            if index > 0 && !self.pacing_delay.is_zero() {
                debug!(
                    "Pacing {:?} before trying '{}'",
                    self.pacing_delay, provider_id
                );
                tokio::time::sleep(self.pacing_delay).await;
            }

            debug!("Fetching stats for {} from '{}'", handle, provider_id);

            match provider.fetch(handle).await {
                Ok(mut record) => {
                    record.source_provider_id = provider_id.clone();
                    record.is_synthetic = false;
                    diagnostics.record_success(provider_id);
                    info!(
                        "Fetched stats for {} ({})",
                        handle,
                        diagnostics.summary()
                    );
                    return (Some(record), diagnostics);
                }
                Err(e) => {
                    warn!(
                        "Provider '{}' failed for {}: {}, trying next provider",
                        provider_id, handle, e
                    );
                    diagnostics.record_error(provider_id, e);
                }
            }
        }

        warn!(
            "All providers failed for {}: {}",
            handle,
            diagnostics.summary()
        );

        match self.fallback_mode {
            FallbackMode::Strict => (None, diagnostics),
            FallbackMode::Synthetic => {
                let record = self.synthetic.generate(handle);
                diagnostics.record_synthetic();
                info!("Returning synthetic stats for {}", handle);
                (Some(record), diagnostics)
            }
        }
    }
}

/// Arrange providers by priority.
fn order_providers(
    providers: Vec<Arc<dyn StatsProvider>>,
    priority: &[ProviderId],
) -> Result<Vec<Arc<dyn StatsProvider>>, EngineError> {
    let mut seen = HashSet::new();
    for provider in &providers {
        let id = provider.id();
        if !seen.insert(id.clone()) {
            return Err(EngineError::InvalidConfig {
                provider: id.to_string(),
                message: "duplicate provider id".to_string(),
            });
        }
    }

    if priority.is_empty() {
        return Ok(providers);
    }

    let mut ordered = Vec::with_capacity(priority.len());
    let mut listed = HashSet::new();
    for id in priority {
        if !listed.insert(id.clone()) {
            return Err(EngineError::InvalidConfig {
                provider: id.to_string(),
                message: "listed twice in priority".to_string(),
            });
        }

        let provider = providers
            .iter()
            .find(|p| p.id() == *id)
            .ok_or_else(|| EngineError::UnknownProvider(id.to_string()))?;
        ordered.push(provider.clone());
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{FetchError, FetchOutcome};
    use crate::models::Platform;
    use std::borrow::Cow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockProvider {
        id: &'static str,
        outcome: Result<u64, FetchError>,
        call_count: AtomicUsize,
        call_log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl MockProvider {
        fn new(
            id: &'static str,
            outcome: Result<u64, FetchError>,
            call_log: Arc<Mutex<Vec<&'static str>>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                id,
                outcome,
                call_count: AtomicUsize::new(0),
                call_log,
            })
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl StatsProvider for MockProvider {
        fn id(&self) -> ProviderId {
            Cow::Borrowed(self.id)
        }

        async fn fetch(&self, handle: &PlayerHandle) -> FetchOutcome {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.call_log.lock().unwrap().push(self.id);

            match &self.outcome {
                Ok(kills) => {
                    // Deliberately mislabelled to check the registry stamps the id
                    let mut record =
                        CanonicalStatsRecord::zeroed(handle.clone(), Cow::Borrowed("WRONG"));
                    record.kills = *kills;
                    Ok(record)
                }
                Err(e) => Err(e.clone()),
            }
        }
    }

    fn handle() -> PlayerHandle {
        PlayerHandle::new("alpha#123", Platform::Battlenet)
    }

    fn engine_config(mode: FallbackMode) -> EngineConfig {
        EngineConfig::default()
            .with_priority(Vec::<ProviderId>::new())
            .with_fallback_mode(mode)
            .with_pacing_delay(Duration::from_secs(1))
    }

    fn as_dyn(providers: &[&Arc<MockProvider>]) -> Vec<Arc<dyn StatsProvider>> {
        providers
            .iter()
            .map(|p| (*p).clone() as Arc<dyn StatsProvider>)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = MockProvider::new("A", Err(FetchError::NotFound), log.clone());
        let b = MockProvider::new("B", Err(FetchError::Transient { status: 503 }), log.clone());
        let c = MockProvider::new("C", Ok(42), log.clone());

        let registry =
            ProviderRegistry::new(as_dyn(&[&a, &b, &c]), &engine_config(FallbackMode::Strict))
                .unwrap();

        let (record, diagnostics) = registry.fetch_with_diagnostics(&handle()).await;
        let record = record.unwrap();

        assert_eq!(record.source_provider_id, "C");
        assert_eq!(record.kills, 42);
        assert!(!record.is_synthetic);
        assert_eq!(*log.lock().unwrap(), vec!["A", "B", "C"]);
        assert_eq!(
            diagnostics.summary(),
            "A: NOT_FOUND -> B: TRANSIENT -> C: SUCCESS"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_circuit_on_first_success() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = MockProvider::new("A", Ok(1), log.clone());
        let b = MockProvider::new("B", Ok(2), log.clone());

        let registry =
            ProviderRegistry::new(as_dyn(&[&a, &b]), &engine_config(FallbackMode::Strict))
                .unwrap();

        let record = registry.fetch_player_stats(&handle()).await.unwrap();
        assert_eq!(record.source_provider_id, "A");
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_strict_mode_returns_none() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = MockProvider::new("A", Err(FetchError::NotFound), log.clone());
        let b = MockProvider::new(
            "B",
            Err(FetchError::RateLimited {
                retry_after: Duration::from_secs(30),
            }),
            log.clone(),
        );

        let registry =
            ProviderRegistry::new(as_dyn(&[&a, &b]), &engine_config(FallbackMode::Strict))
                .unwrap();

        let (record, diagnostics) = registry.fetch_with_diagnostics(&handle()).await;
        assert!(record.is_none());
        assert!(!diagnostics.has_success());
        assert_eq!(diagnostics.summary(), "A: NOT_FOUND -> B: RATE_LIMITED");
    }

    #[tokio::test(start_paused = true)]
    async fn test_synthetic_mode_tags_record() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = MockProvider::new("A", Err(FetchError::malformed("no stats")), log.clone());

        let registry =
            ProviderRegistry::new(as_dyn(&[&a]), &engine_config(FallbackMode::Synthetic))
                .unwrap();

        let (record, diagnostics) = registry.fetch_with_diagnostics(&handle()).await;
        let record = record.unwrap();
        assert!(record.is_synthetic);
        assert_eq!(record.source_provider_id, "SYNTHETIC");
        assert_eq!(record.handle, handle());
        assert!(diagnostics.synthetic);
        assert_eq!(diagnostics.summary(), "A: MALFORMED -> SYNTHETIC");
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_between_providers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = MockProvider::new("A", Err(FetchError::NotFound), log.clone());
        let b = MockProvider::new("B", Err(FetchError::NotFound), log.clone());
        let c = MockProvider::new("C", Ok(1), log.clone());

        let registry =
            ProviderRegistry::new(as_dyn(&[&a, &b, &c]), &engine_config(FallbackMode::Strict))
                .unwrap();

        let start = tokio::time::Instant::now();
        registry.fetch_player_stats(&handle()).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_pacing_before_first_provider() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = MockProvider::new("A", Ok(1), log.clone());

        let registry =
            ProviderRegistry::new(as_dyn(&[&a]), &engine_config(FallbackMode::Strict)).unwrap();

        let start = tokio::time::Instant::now();
        registry.fetch_player_stats(&handle()).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_priority_reorders_and_filters() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = MockProvider::new("A", Ok(1), log.clone());
        let b = MockProvider::new("B", Ok(2), log.clone());
        let c = MockProvider::new("C", Ok(3), log.clone());

        let config = engine_config(FallbackMode::Strict).with_priority(["C", "A"]);
        let registry = ProviderRegistry::new(as_dyn(&[&a, &b, &c]), &config).unwrap();

        let ids: Vec<_> = registry.providers().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["C", "A"]);

        let record = registry.fetch_player_stats(&handle()).await.unwrap();
        assert_eq!(record.source_provider_id, "C");
        assert_eq!(b.calls(), 0);
    }

    #[test]
    fn test_unknown_provider_in_priority() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = MockProvider::new("A", Ok(1), log);

        let config = engine_config(FallbackMode::Strict).with_priority(["A", "Z"]);
        let result = ProviderRegistry::new(as_dyn(&[&a]), &config);
        assert!(matches!(result, Err(EngineError::UnknownProvider(id)) if id == "Z"));
    }

    #[test]
    fn test_empty_provider_list() {
        let result = ProviderRegistry::new(Vec::new(), &engine_config(FallbackMode::Strict));
        assert!(matches!(result, Err(EngineError::NoProvidersConfigured)));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = MockProvider::new("A", Ok(1), log.clone());
        let a2 = MockProvider::new("A", Ok(2), log);

        let result =
            ProviderRegistry::new(as_dyn(&[&a, &a2]), &engine_config(FallbackMode::Strict));
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_from_configs_rejects_invalid_config() {
        use crate::provider::{ReqwestTransport, ResponseShape};

        let bad = ProviderConfig::new(
            "BAD",
            "https://stats.example.com",
            "/warzone/{username}",
            ResponseShape::FlatStats,
        )
        .with_rate_limit(0, 60);

        let result = ProviderRegistry::from_configs(
            &engine_config(FallbackMode::Strict),
            vec![bad],
            Arc::new(ReqwestTransport::new()),
        );
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_default_config_with_builtins_and_no_api_key() {
        use crate::provider::{catalog, ReqwestTransport};

        let registry = ProviderRegistry::from_configs(
            &EngineConfig::default(),
            vec![catalog::cod_api_hub(), catalog::tracker_gg()],
            Arc::new(ReqwestTransport::new()),
        )
        .unwrap();

        let ids: Vec<_> = registry.providers().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["COD_API_HUB", "TRACKER_GG"]);
    }
}
