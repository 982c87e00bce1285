//! Cost provider: cached access to the tariff system's published rates.
//!
//! All cost data (every country, every box SKU) is fetched in one call and
//! held in a process-wide cache. The cache has no expiry: the tariff system
//! POSTs `/engine/cache-invalidate` whenever it republishes, and staleness
//! between a republish and that signal is an accepted tradeoff. The cache
//! is an atomic-swap `RwLock<Option<Arc<..>>>`: readers clone the `Arc`,
//! the invalidation writer swaps in `None`, last write wins.
//!
//! Graceful degradation: if the tariff system is unreachable or not
//! configured, lookups return `None` (never an error) and the ranker skips
//! its cost tier.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use florapack_core::costs::{CostEntry, CountryCosts};

/// Every country's cost table, keyed by upper-case country code.
pub type AllCosts = HashMap<String, CountryCosts>;

// ---------------------------------------------------------------------------
// Tariff source
// ---------------------------------------------------------------------------

/// Upstream source of published rates. Abstracted so tests can swap in a
/// canned implementation.
#[async_trait]
pub trait TariffSource: Send + Sync {
    /// Fetch all published rates. `None` = source unreachable.
    async fn fetch_all(&self) -> Option<AllCosts>;
}

/// One rate row as published by the tariff system.
#[derive(Debug, Deserialize)]
struct PublishedRate {
    box_sku: String,
    country_code: String,
    carrier: String,
    weight_bracket: Option<String>,
    box_cost: f64,
    transport_cost: f64,
}

#[derive(Debug, Deserialize)]
struct PublishedRatesResponse {
    rates: Vec<PublishedRate>,
}

/// Production tariff source: `GET {TARIFF_API_URL}/published-rates`.
pub struct HttpTariffSource {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl HttpTariffSource {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

#[async_trait]
impl TariffSource for HttpTariffSource {
    async fn fetch_all(&self) -> Option<AllCosts> {
        let Some(base) = &self.base_url else {
            tracing::warn!("TARIFF_API_URL unset, cost data unavailable");
            return None;
        };
        let url = format!("{base}/published-rates");

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "Tariff system unreachable");
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Tariff system returned an error");
            return None;
        }
        let body: PublishedRatesResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to decode published rates");
                return None;
            }
        };

        let mut all = AllCosts::new();
        for rate in body.rates {
            let entry = CostEntry {
                total_cost: rate.box_cost + rate.transport_cost,
                box_sku: rate.box_sku.clone(),
                weight_bracket: rate.weight_bracket,
                box_cost: rate.box_cost,
                transport_cost: rate.transport_cost,
                carrier: rate.carrier,
            };
            all.entry(rate.country_code.to_uppercase())
                .or_default()
                .entry(rate.box_sku)
                .or_default()
                .push(entry);
        }
        Some(all)
    }
}

// ---------------------------------------------------------------------------
// Cached provider
// ---------------------------------------------------------------------------

/// Process-wide cost cache over a [`TariffSource`].
pub struct CostProvider {
    source: Box<dyn TariffSource>,
    cache: RwLock<Option<Arc<AllCosts>>>,
}

impl CostProvider {
    pub fn new(source: Box<dyn TariffSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(None),
        }
    }

    /// All cost entries for one country, keyed by box SKU.
    ///
    /// `None` = tariff source unreachable; `Some(empty)` = no routes for
    /// this country.
    pub async fn all_costs_for_country(&self, country_code: &str) -> Option<CountryCosts> {
        let table = self.ensure_cache().await?;
        Some(
            table
                .get(&country_code.to_uppercase())
                .cloned()
                .unwrap_or_default(),
        )
    }

    /// Drop the cache; the next lookup refetches from the source.
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
        tracing::info!("Cost cache invalidated");
    }

    async fn ensure_cache(&self) -> Option<Arc<AllCosts>> {
        if let Some(table) = self.cache.read().await.as_ref() {
            return Some(Arc::clone(table));
        }

        // Unreachable fetches are not cached, so recovery is immediate once
        // the tariff system is back.
        let fresh = Arc::new(self.source.fetch_all().await?);
        *self.cache.write().await = Some(Arc::clone(&fresh));
        Some(fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Canned tariff source with a fetch counter and swappable data, both
    /// shared with the test through `Arc` handles.
    struct FakeSource {
        fetches: Arc<AtomicUsize>,
        data: Arc<Mutex<Option<AllCosts>>>,
    }

    impl FakeSource {
        fn new(data: Option<AllCosts>) -> (Self, Arc<AtomicUsize>, Arc<Mutex<Option<AllCosts>>>) {
            let fetches = Arc::new(AtomicUsize::new(0));
            let data = Arc::new(Mutex::new(data));
            let source = Self {
                fetches: Arc::clone(&fetches),
                data: Arc::clone(&data),
            };
            (source, fetches, data)
        }
    }

    #[async_trait]
    impl TariffSource for FakeSource {
        async fn fetch_all(&self) -> Option<AllCosts> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.data.lock().unwrap().clone()
        }
    }

    fn costs_with(country: &str, sku: &str, total: f64) -> AllCosts {
        let entry = CostEntry {
            box_sku: sku.to_string(),
            weight_bracket: None,
            box_cost: total / 2.0,
            transport_cost: total / 2.0,
            total_cost: total,
            carrier: "postnl".to_string(),
        };
        let mut by_sku = CountryCosts::new();
        by_sku.insert(sku.to_string(), vec![entry]);
        let mut all = AllCosts::new();
        all.insert(country.to_string(), by_sku);
        all
    }

    #[tokio::test]
    async fn second_lookup_hits_the_cache() {
        let (source, fetches, _) = FakeSource::new(Some(costs_with("DE", "SKU-1", 5.0)));
        let provider = CostProvider::new(Box::new(source));

        assert!(provider.all_costs_for_country("DE").await.is_some());
        assert!(provider.all_costs_for_country("DE").await.is_some());
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch_with_fresh_data() {
        let (source, fetches, data) = FakeSource::new(Some(costs_with("DE", "SKU-1", 5.0)));
        let provider = CostProvider::new(Box::new(source));

        let before = provider.all_costs_for_country("DE").await.unwrap();
        assert_eq!(before["SKU-1"][0].total_cost, 5.0);

        // Tariff system republishes, then signals invalidation. No stale
        // read may survive one invalidation plus one fetch.
        *data.lock().unwrap() = Some(costs_with("DE", "SKU-1", 7.5));
        provider.invalidate().await;

        let after = provider.all_costs_for_country("DE").await.unwrap();
        assert_eq!(after["SKU-1"][0].total_cost, 7.5);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn republish_without_invalidation_keeps_serving_the_cache() {
        let (source, _, data) = FakeSource::new(Some(costs_with("DE", "SKU-1", 5.0)));
        let provider = CostProvider::new(Box::new(source));

        assert!(provider.all_costs_for_country("DE").await.is_some());
        *data.lock().unwrap() = Some(costs_with("DE", "SKU-1", 7.5));

        // Accepted staleness: no expiry, only the external signal refreshes.
        let stale = provider.all_costs_for_country("DE").await.unwrap();
        assert_eq!(stale["SKU-1"][0].total_cost, 5.0);
    }

    #[tokio::test]
    async fn unreachable_source_returns_none_and_is_not_cached() {
        let (source, fetches, data) = FakeSource::new(None);
        let provider = CostProvider::new(Box::new(source));

        assert!(provider.all_costs_for_country("DE").await.is_none());
        assert!(provider.all_costs_for_country("DE").await.is_none());
        // Every lookup retried the source instead of caching the outage.
        assert_eq!(fetches.load(Ordering::SeqCst), 2);

        // Once the source recovers, lookups succeed without invalidation.
        *data.lock().unwrap() = Some(costs_with("DE", "SKU-1", 5.0));
        assert!(provider.all_costs_for_country("DE").await.is_some());
    }

    #[tokio::test]
    async fn unknown_country_is_empty_not_none() {
        let (source, _, _) = FakeSource::new(Some(costs_with("DE", "SKU-1", 5.0)));
        let provider = CostProvider::new(Box::new(source));
        let costs = provider.all_costs_for_country("FR").await;
        assert_eq!(costs, Some(CountryCosts::new()));
    }

    #[tokio::test]
    async fn country_lookup_is_case_insensitive() {
        let (source, _, _) = FakeSource::new(Some(costs_with("DE", "SKU-1", 5.0)));
        let provider = CostProvider::new(Box::new(source));
        let costs = provider.all_costs_for_country("de").await.unwrap();
        assert!(costs.contains_key("SKU-1"));
    }
}
