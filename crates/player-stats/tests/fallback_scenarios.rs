//! End-to-end fallback scenarios through the public API.
//!
//! HTTP is replaced by a transport that replays canned responses per host.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use statline_player_stats::{
    normalize, normalize_platform, strip_discriminator, EngineConfig, FallbackMode, HttpRequest,
    HttpResponse, HttpTransport, Platform, PlayerHandle, ProviderConfig, ProviderId,
    ProviderRegistry, ResponseShape, TransportError,
};
use tokio::time::Instant;

/// Replays scripted responses keyed by host and records every request.
#[derive(Default)]
struct HostScriptTransport {
    scripts: Mutex<HashMap<String, VecDeque<HttpResponse>>>,
    requests: Mutex<Vec<(Instant, HttpRequest)>>,
}

impl HostScriptTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn script(&self, host: &str, responses: Vec<HttpResponse>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(host.to_string(), responses.into());
    }

    fn requests(&self) -> Vec<(Instant, HttpRequest)> {
        self.requests.lock().unwrap().clone()
    }

    fn hosts_called(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|(_, r)| host_of(&r.url).to_string())
            .collect()
    }
}

fn host_of(url: &str) -> &str {
    url.trim_start_matches("https://")
        .split('/')
        .next()
        .unwrap_or_default()
}

#[async_trait]
impl HttpTransport for HostScriptTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let host = host_of(&request.url).to_string();
        self.requests
            .lock()
            .unwrap()
            .push((Instant::now(), request));

        self.scripts
            .lock()
            .unwrap()
            .get_mut(&host)
            .and_then(|queue| queue.pop_front())
            .ok_or_else(|| TransportError::Connection(format!("no script for {}", host)))
    }
}

fn status(status: u16) -> HttpResponse {
    HttpResponse {
        status,
        retry_after: None,
        body: String::new(),
    }
}

fn body(value: serde_json::Value) -> HttpResponse {
    HttpResponse {
        status: 200,
        retry_after: None,
        body: value.to_string(),
    }
}

fn flat_provider(id: &'static str, host: &str) -> ProviderConfig {
    ProviderConfig::new(
        id,
        format!("https://{}", host),
        "/warzone/{username}/{platform}",
        ResponseShape::FlatStats,
    )
    .with_platform_alias(Platform::Battlenet, "battle")
    .with_rate_limit(100, 60)
    .with_retry(2, 1)
    .with_rate_limit_penalty(5)
}

fn engine(mode: FallbackMode, priority: &[&'static str]) -> EngineConfig {
    EngineConfig::default()
        .with_priority(priority.iter().copied())
        .with_fallback_mode(mode)
        .with_pacing_delay(Duration::from_millis(500))
}

#[tokio::test(start_paused = true)]
async fn test_example_scenario_second_provider_answers() {
    let transport = HostScriptTransport::new();
    transport.script("a.example.com", vec![status(404)]);
    transport.script(
        "b.example.com",
        vec![body(json!({
            "stats": {"kills": 1000, "deaths": 500, "kdRatio": 2.0, "wins": 50}
        }))],
    );

    let registry = ProviderRegistry::from_configs(
        &engine(FallbackMode::Strict, &["A", "B"]),
        vec![
            flat_provider("A", "a.example.com"),
            flat_provider("B", "b.example.com"),
        ],
        transport.clone(),
    )
    .unwrap();

    let handle = PlayerHandle::parse("alpha#123", "battle").unwrap();
    let record = registry.fetch_player_stats(&handle).await.unwrap();

    assert_eq!(record.kills, 1000);
    assert_eq!(record.deaths, 500);
    assert_eq!(record.kd_ratio, 2.0);
    assert_eq!(record.wins, 50);
    assert_eq!(record.source_provider_id, "B");
    assert!(!record.is_synthetic);
    assert_eq!(record.handle.name, "alpha#123");
    assert_eq!(record.handle.platform, Platform::Battlenet);

    // 404 is never retried
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].1.url, "https://a.example.com/warzone/alpha/battle");
    assert_eq!(requests[1].1.url, "https://b.example.com/warzone/alpha/battle");
}

#[tokio::test(start_paused = true)]
async fn test_fallback_order_is_deterministic() {
    let transport = HostScriptTransport::new();
    transport.script("a.example.com", vec![status(404)]);
    transport.script("b.example.com", vec![status(500), status(500)]);
    transport.script("c.example.com", vec![body(json!({"stats": {"kills": 7}}))]);

    let registry = ProviderRegistry::from_configs(
        &engine(FallbackMode::Strict, &["A", "B", "C"]),
        vec![
            flat_provider("C", "c.example.com"),
            flat_provider("A", "a.example.com"),
            flat_provider("B", "b.example.com"),
        ],
        transport.clone(),
    )
    .unwrap();

    let handle = PlayerHandle::new("alpha", Platform::Psn);
    let (record, diagnostics) = registry.fetch_with_diagnostics(&handle).await;

    assert_eq!(record.unwrap().source_provider_id, "C");
    assert_eq!(
        transport.hosts_called(),
        vec!["a.example.com", "b.example.com", "b.example.com", "c.example.com"]
    );
    assert_eq!(
        diagnostics.summary(),
        "A: NOT_FOUND -> B: TRANSIENT -> C: SUCCESS"
    );
}

#[tokio::test(start_paused = true)]
async fn test_short_circuit_leaves_later_providers_untouched() {
    let transport = HostScriptTransport::new();
    transport.script("a.example.com", vec![body(json!({"stats": {"kills": 1}}))]);
    transport.script("b.example.com", vec![body(json!({"stats": {"kills": 2}}))]);

    let registry = ProviderRegistry::from_configs(
        &engine(FallbackMode::Strict, &["A", "B"]),
        vec![
            flat_provider("A", "a.example.com"),
            flat_provider("B", "b.example.com"),
        ],
        transport.clone(),
    )
    .unwrap();

    let record = registry
        .fetch_player_stats(&PlayerHandle::new("alpha", Platform::Xbl))
        .await
        .unwrap();

    assert_eq!(record.source_provider_id, "A");
    assert_eq!(transport.hosts_called(), vec!["a.example.com"]);
}

#[tokio::test(start_paused = true)]
async fn test_all_failing_strict_returns_none() {
    let transport = HostScriptTransport::new();
    transport.script("a.example.com", vec![status(404)]);
    transport.script("b.example.com", vec![body(json!({"unexpected": true}))]);

    let registry = ProviderRegistry::from_configs(
        &engine(FallbackMode::Strict, &["A", "B"]),
        vec![
            flat_provider("A", "a.example.com"),
            flat_provider("B", "b.example.com"),
        ],
        transport,
    )
    .unwrap();

    let (record, diagnostics) = registry
        .fetch_with_diagnostics(&PlayerHandle::new("alpha", Platform::Steam))
        .await;

    assert!(record.is_none());
    assert_eq!(diagnostics.summary(), "A: NOT_FOUND -> B: MALFORMED");
}

#[tokio::test(start_paused = true)]
async fn test_all_failing_synthetic_is_tagged() {
    // No scripts: every request fails at the network level
    let transport = HostScriptTransport::new();

    let registry = ProviderRegistry::from_configs(
        &engine(FallbackMode::Synthetic, &["A"]),
        vec![flat_provider("A", "a.example.com")],
        transport.clone(),
    )
    .unwrap();

    let handle = PlayerHandle::new("ghost", Platform::Uno);
    let record = registry.fetch_player_stats(&handle).await.unwrap();

    assert!(record.is_synthetic);
    assert_eq!(record.source_provider_id, "SYNTHETIC");
    assert_eq!(record.handle, handle);
    assert!(record.deaths > 0);
    let expected = record.kills as f64 / record.deaths as f64;
    assert!((record.kd_ratio - expected).abs() < 0.01);

    // Network errors are retried up to the attempt budget
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_provider_waits_penalty_then_succeeds() {
    let transport = HostScriptTransport::new();
    transport.script(
        "a.example.com",
        vec![
            status(429),
            status(429),
            status(429),
            body(json!({"stats": {"kills": 5}})),
        ],
    );

    let registry = ProviderRegistry::from_configs(
        &engine(FallbackMode::Strict, &["A"]),
        vec![flat_provider("A", "a.example.com")],
        transport.clone(),
    )
    .unwrap();

    let record = registry
        .fetch_player_stats(&PlayerHandle::new("alpha", Platform::Psn))
        .await
        .unwrap();
    assert_eq!(record.kills, 5);

    // More HTTP attempts than max_retry_attempts (2), each extension preceded by the penalty
    let requests = transport.requests();
    assert_eq!(requests.len(), 4);
    for pair in requests.windows(2) {
        assert!(pair[1].0.duration_since(pair[0].0) >= Duration::from_secs(5));
    }
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_fetches_respect_shared_window() {
    let transport = HostScriptTransport::new();
    transport.script(
        "a.example.com",
        (0..6).map(|i| body(json!({"stats": {"kills": i}}))).collect(),
    );

    let config = flat_provider("A", "a.example.com").with_rate_limit(2, 60);
    let registry = Arc::new(
        ProviderRegistry::from_configs(
            &engine(FallbackMode::Strict, &["A"]),
            vec![config],
            transport.clone(),
        )
        .unwrap(),
    );

    let mut handles = Vec::new();
    for i in 0..6 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move {
            let handle = PlayerHandle::new(format!("player{}", i), Platform::Xbl);
            registry.fetch_player_stats(&handle).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_some());
    }

    let times: Vec<Instant> = transport.requests().into_iter().map(|(t, _)| t).collect();
    assert_eq!(times.len(), 6);
    for (i, start) in times.iter().enumerate() {
        let in_window = times[i..]
            .iter()
            .filter(|t| t.duration_since(*start) < Duration::from_secs(60))
            .count();
        assert!(in_window <= 2, "more than 2 requests within 60s");
    }
}

#[test]
fn test_engine_rejects_unknown_priority_entry() {
    let transport = HostScriptTransport::new();
    let result = ProviderRegistry::from_configs(
        &engine(FallbackMode::Strict, &["A", "MISSING"]),
        vec![flat_provider("A", "a.example.com")],
        transport,
    );
    assert!(result.is_err());
}

#[test]
fn test_handle_normalization_is_idempotent() {
    assert_eq!(normalize_platform("battle"), normalize_platform("battlenet"));
    assert_eq!(normalize_platform(" BATTLE "), Some(Platform::Battlenet));

    for name in ["alpha#123", "alpha", "a#b#c", "#1234", ""] {
        let once = strip_discriminator(name);
        assert_eq!(strip_discriminator(once), once);
    }
}

#[test]
fn test_payload_without_optional_fields_normalizes_to_zero() {
    let handle = PlayerHandle::new("alpha", Platform::Psn);
    let provider: ProviderId = "X".into();

    for (raw, shape) in [
        (json!({"stats": {}}), ResponseShape::FlatStats),
        (json!({"data": {"stats": {}}}), ResponseShape::NestedDataStats),
        (json!({"data": {"stats": []}}), ResponseShape::KeyValueList),
    ] {
        let record = normalize(&raw, shape, &handle, &provider).unwrap();
        assert_eq!(record.kills, 0);
        assert_eq!(record.deaths, 0);
        assert_eq!(record.kd_ratio, 0.0);
        assert_eq!(record.time_played_seconds, 0);
        assert!(!record.is_synthetic);
    }
}
