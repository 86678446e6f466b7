//! TTL product cache
//!
//! Readers clone an `Arc<CatalogSnapshot>` out of a `parking_lot::RwLock`
//! and drop the lock immediately, so ranking never blocks a refresh.
//! Refreshes are single-flight: the async mutex serializes them and every
//! finished attempt bumps a generation counter. Callers that queued behind
//! an attempt share its outcome, success or failure, instead of fetching
//! again, so a dead backend costs one timeout per burst rather than one
//! per caller.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::Mutex;

use figuro_voice_config::constants::relevance::{
    CATEGORY_MATCH, MAX_RECOMMENDATIONS, PRICE_MATCH, PRODUCT_MATCH,
};
use figuro_voice_config::CatalogConfig;
use figuro_voice_core::{
    BackendError, Category, Entity, EntityType, Intent, Product, ProductBackend,
    RecommendedProduct,
};

use crate::price::PriceBand;
use crate::CatalogError;

/// Default page size for product search
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Point-in-time copy of the catalog
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub products: BTreeMap<u64, Product>,
    pub categories: BTreeMap<u64, Category>,
    /// `None` until the first successful refresh
    pub last_refresh: Option<Instant>,
}

impl CatalogSnapshot {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.last_refresh
            .map(|at| at.elapsed() < ttl)
            .unwrap_or(false)
    }
}

/// Cache behaviour knobs
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl: Duration,
    /// Applied to each backend call separately
    pub fetch_timeout: Duration,
    pub max_recommendations: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::from(&CatalogConfig::default())
    }
}

impl From<&CatalogConfig> for CacheConfig {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            ttl: Duration::from_secs(config.ttl_seconds),
            fetch_timeout: Duration::from_millis(config.timeout_ms),
            max_recommendations: config.max_recommendations.min(MAX_RECOMMENDATIONS),
        }
    }
}

/// Product cache in front of a [`ProductBackend`]
pub struct ProductCache {
    backend: Arc<dyn ProductBackend>,
    config: CacheConfig,
    snapshot: RwLock<Arc<CatalogSnapshot>>,
    refresh_lock: Mutex<()>,
    /// Finished refresh attempts
    generation: AtomicU64,
    /// Error of the most recent attempt, cleared on success
    last_failure: RwLock<Option<String>>,
}

impl ProductCache {
    pub fn new(backend: Arc<dyn ProductBackend>, config: CacheConfig) -> Self {
        Self {
            backend,
            config,
            snapshot: RwLock::new(Arc::new(CatalogSnapshot::default())),
            refresh_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
            last_failure: RwLock::new(None),
        }
    }

    /// Current snapshot, without refreshing
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.snapshot.read().clone()
    }

    pub fn is_fresh(&self) -> bool {
        self.snapshot().is_fresh(self.config.ttl)
    }

    /// Age of the last successful refresh
    pub fn last_refresh_age(&self) -> Option<Duration> {
        self.snapshot().last_refresh.map(|at| at.elapsed())
    }

    pub fn product_count(&self) -> usize {
        self.snapshot().products.len()
    }

    /// Reload from the backend if the snapshot is older than the TTL.
    ///
    /// On failure the old snapshot stays in place, `last_refresh` included,
    /// so the next call tries again. Callers that were waiting on an
    /// in-flight attempt get that attempt's outcome without a second fetch.
    pub async fn refresh(&self) -> Result<(), CatalogError> {
        if self.is_fresh() {
            return Ok(());
        }

        let seen = self.generation.load(Ordering::Acquire);
        let _guard = self.refresh_lock.lock().await;
        if self.is_fresh() {
            return Ok(());
        }
        if self.generation.load(Ordering::Acquire) != seen {
            return match self.last_failure.read().clone() {
                Some(message) => Err(CatalogError::RefreshFailed(message)),
                None => Ok(()),
            };
        }

        let started = Instant::now();
        let outcome = self.fetch().await;
        let result = match outcome {
            Ok((products, categories)) => {
                let snapshot = CatalogSnapshot {
                    products: products.into_iter().map(|p| (p.id, p)).collect(),
                    categories: categories.into_iter().map(|c| (c.id, c)).collect(),
                    last_refresh: Some(Instant::now()),
                };
                tracing::info!(
                    products = snapshot.products.len(),
                    categories = snapshot.categories.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Product cache refreshed"
                );
                *self.snapshot.write() = Arc::new(snapshot);
                *self.last_failure.write() = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Product cache refresh failed, keeping previous snapshot");
                metrics::counter!("figuro_voice_errors_total", "kind" => "catalog").increment(1);
                *self.last_failure.write() = Some(e.to_string());
                Err(e)
            }
        };
        self.generation.fetch_add(1, Ordering::Release);
        result
    }

    async fn fetch(&self) -> Result<(Vec<Product>, Vec<Category>), CatalogError> {
        let timeout = self.config.fetch_timeout;
        let timeout_ms = timeout.as_millis() as u64;

        let (products, categories) = tokio::join!(
            tokio::time::timeout(timeout, self.backend.list_products()),
            tokio::time::timeout(timeout, self.backend.list_categories()),
        );

        let products = products
            .unwrap_or_else(|_| Err(BackendError::Timeout(timeout_ms)))
            .map_err(|source| CatalogError::Fetch {
                resource: "products",
                source,
            })?;
        let categories = categories
            .unwrap_or_else(|_| Err(BackendError::Timeout(timeout_ms)))
            .map_err(|source| CatalogError::Fetch {
                resource: "categories",
                source,
            })?;

        Ok((products, categories))
    }

    /// Rank cached products against the extracted entities.
    ///
    /// Returns at most `max_recommendations` products (never more than
    /// five) with a positive score, highest first; ties keep catalog order.
    pub async fn recommend(&self, intent: Intent, entities: &[Entity]) -> Vec<RecommendedProduct> {
        let _ = self.refresh().await;
        let snapshot = self.snapshot();

        let ranked = rank(
            snapshot.products.values(),
            entities,
            self.config.max_recommendations.min(MAX_RECOMMENDATIONS),
        );

        tracing::debug!(
            intent = %intent,
            candidates = snapshot.products.len(),
            returned = ranked.len(),
            "Ranked recommendations"
        );
        ranked
    }

    /// Case-insensitive substring search over product and category names
    pub async fn search(
        &self,
        query: &str,
        category_id: Option<u64>,
        limit: Option<usize>,
    ) -> Vec<Product> {
        let _ = self.refresh().await;
        let needle = query.trim().to_lowercase();
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);

        self.snapshot()
            .products
            .values()
            .filter(|p| category_id.map_or(true, |id| p.category.id == id))
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.category.name.to_lowercase().contains(&needle)
            })
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn categories(&self) -> Vec<Category> {
        let _ = self.refresh().await;
        self.snapshot().categories.values().cloned().collect()
    }

    /// Products in a category and/or under a price ceiling
    pub async fn recommendations_for(
        &self,
        category_id: Option<u64>,
        price_max: Option<u64>,
        limit: usize,
    ) -> Vec<Product> {
        let _ = self.refresh().await;
        self.snapshot()
            .products
            .values()
            .filter(|p| category_id.map_or(true, |id| p.category.id == id))
            .filter(|p| price_max.map_or(true, |max| p.price <= max))
            .take(limit)
            .cloned()
            .collect()
    }
}

/// Score products: +10 product name hit, +8 category hit, +5 price band hit
pub fn rank<'a>(
    products: impl Iterator<Item = &'a Product>,
    entities: &[Entity],
    limit: usize,
) -> Vec<RecommendedProduct> {
    let values = |ty: EntityType| -> Vec<String> {
        entities
            .iter()
            .filter(|e| e.is(ty))
            .map(|e| e.value.to_lowercase())
            .filter(|v| !v.is_empty())
            .collect()
    };
    let product_terms = values(EntityType::Product);
    let category_terms = values(EntityType::Category);
    let bands: Vec<PriceBand> = entities
        .iter()
        .filter(|e| e.is(EntityType::PriceRange))
        .filter_map(|e| PriceBand::from_entity_value(&e.value))
        .collect();

    let mut scored: Vec<RecommendedProduct> = products
        .filter_map(|product| {
            let name = product.name.to_lowercase();
            let category = product.category.name.to_lowercase();

            let mut score = 0;
            if product_terms.iter().any(|t| name.contains(t.as_str())) {
                score += PRODUCT_MATCH;
            }
            if category_terms.iter().any(|t| category.contains(t.as_str())) {
                score += CATEGORY_MATCH;
            }
            if bands.iter().any(|b| b.matches(product.price)) {
                score += PRICE_MATCH;
            }

            (score > 0).then(|| RecommendedProduct {
                product: product.clone(),
                relevance_score: score,
            })
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use figuro_voice_core::CategoryRef;

    fn product(id: u64, name: &str, price: u64, category: &str) -> Product {
        Product::new(
            id,
            name,
            price,
            CategoryRef {
                id: id * 100,
                name: category.to_string(),
            },
        )
    }

    fn entity(ty: EntityType, value: &str) -> Entity {
        Entity::new(ty, value, 0.8)
    }

    #[test]
    fn test_rank_weights() {
        let products = vec![
            product(1, "Naruto Sage Mode", 1_500_000, "Naruto"),
            product(2, "Luffy Gear 5", 3_500_000, "One Piece"),
            product(3, "Goku Ultra Instinct", 2_500_000, "Dragon Ball"),
        ];
        let entities = vec![
            entity(EntityType::Product, "naruto"),
            entity(EntityType::Category, "one piece"),
            entity(EntityType::PriceRange, "giá rẻ"),
        ];
        let ranked = rank(products.iter(), &entities, 5);
        let scores: Vec<(u64, u32)> = ranked
            .iter()
            .map(|r| (r.product.id, r.relevance_score))
            .collect();
        // naruto: product + cheap = 15; luffy: category = 8; goku: nothing
        assert_eq!(scores, vec![(1, 15), (2, 8)]);
    }

    #[test]
    fn test_rank_is_stable_and_capped() {
        let products: Vec<Product> = (1..=8)
            .map(|i| product(i, &format!("Naruto {i}"), 1_000_000, "Naruto"))
            .collect();
        let ranked = rank(products.iter(), &[entity(EntityType::Product, "naruto")], 5);
        let ids: Vec<u64> = ranked.iter().map(|r| r.product.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_rank_without_entities_is_empty() {
        let products = vec![product(1, "Naruto", 1_000_000, "Naruto")];
        assert!(rank(products.iter(), &[], 5).is_empty());
    }

    #[test]
    fn test_rank_under_band() {
        let products = vec![
            product(1, "A", 2_000_000, "X"),
            product(2, "B", 2_000_001, "X"),
        ];
        let ranked = rank(
            products.iter(),
            &[entity(EntityType::PriceRange, "dưới 2 triệu")],
            5,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].product.id, 1);
        assert_eq!(ranked[0].relevance_score, PRICE_MATCH);
    }
}
