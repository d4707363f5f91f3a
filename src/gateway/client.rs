//! The client facade: cache-fronted search, details, recommendations,
//! and geolocation.
//!
//! Every read follows cache-then-network: the appropriate namespace is
//! consulted first, and a successful upstream response is written back
//! before it is returned, so an immediately following read observes it.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::cache::{TtlCache, key};
use crate::recommend::Recommender;
use crate::services::{GeocodeService, PetListingService};
use crate::telemetry;
use crate::types::{
    CandidatePet, PetRecord, PostalArea, Recommendation, SearchResults, is_valid_postal_code,
};
use crate::{PetMatchError, Result};

/// Client for pet-adoption discovery.
///
/// Construct via [`PetMatch::builder()`](super::PetMatch::builder).
pub struct PetMatchClient {
    listings: Arc<dyn PetListingService>,
    geocode: Arc<dyn GeocodeService>,
    search_cache: TtlCache,
    details_cache: TtlCache,
    recommendation_cache: TtlCache,
    recommender: Recommender,
}

impl PetMatchClient {
    pub(crate) fn new(
        listings: Arc<dyn PetListingService>,
        geocode: Arc<dyn GeocodeService>,
        search_cache: TtlCache,
        details_cache: TtlCache,
        recommendation_cache: TtlCache,
        recommender: Recommender,
    ) -> Self {
        Self {
            listings,
            geocode,
            search_cache,
            details_cache,
            recommendation_cache,
            recommender,
        }
    }

    /// Search adoptable pets near a postal code, optionally filtered by
    /// type.
    ///
    /// Type strings are normalized (case-insensitive, singular or
    /// plural); unknown types are dropped silently. Results are cached
    /// for the short TTL under a key independent of filter order.
    pub async fn search<S: AsRef<str> + Sync>(
        &self,
        postal_code: &str,
        types: &[S],
    ) -> Result<SearchResults> {
        if !is_valid_postal_code(postal_code) {
            return Err(PetMatchError::InvalidPostalCode(postal_code.to_string()));
        }

        let cache_key = key::search_key(postal_code, types);
        if let Some(cached) = self.search_cache.get::<SearchResults>(&cache_key) {
            debug!(key = %cache_key, "serving cached search results");
            return Ok(cached);
        }

        let normalized = key::normalize_types(types);
        let results = observe("listings", "search", self.listings.search(postal_code, &normalized))
            .await?;
        self.search_cache.set(&cache_key, &results);
        Ok(results)
    }

    /// Fetch one pet record, cache-then-network.
    pub async fn pet_details(&self, id: &str) -> Result<PetRecord> {
        let cache_key = key::detail_key(id);
        if let Some(cached) = self.details_cache.get::<PetRecord>(&cache_key) {
            debug!(key = %cache_key, "serving cached pet details");
            return Ok(cached);
        }

        let record = observe("listings", "get_by_id", self.listings.get_by_id(id)).await?;
        self.details_cache.set(&cache_key, &record);
        Ok(record)
    }

    /// Get a recommendation for the search context, served from cache
    /// when a valid one exists.
    pub async fn recommendation<S: AsRef<str> + Sync>(
        &self,
        postal_code: &str,
        types: &[S],
        candidates: &[CandidatePet],
    ) -> Result<Recommendation> {
        self.recommend_inner(postal_code, types, candidates, false)
            .await
    }

    /// Generate a fresh recommendation, bypassing (and replacing) any
    /// cached one.
    pub async fn refresh_recommendation<S: AsRef<str> + Sync>(
        &self,
        postal_code: &str,
        types: &[S],
        candidates: &[CandidatePet],
    ) -> Result<Recommendation> {
        self.recommend_inner(postal_code, types, candidates, true)
            .await
    }

    async fn recommend_inner<S: AsRef<str> + Sync>(
        &self,
        postal_code: &str,
        types: &[S],
        candidates: &[CandidatePet],
        force_refresh: bool,
    ) -> Result<Recommendation> {
        if !is_valid_postal_code(postal_code) {
            return Err(PetMatchError::InvalidPostalCode(postal_code.to_string()));
        }

        let normalized = key::normalize_types(types);
        self.recommender
            .get_or_refresh(postal_code, &normalized, candidates, force_refresh)
            .await
    }

    /// Resolve device coordinates to a postal area. `None` when the
    /// location cannot be resolved.
    pub async fn locate(&self, latitude: f64, longitude: f64) -> Result<Option<PostalArea>> {
        observe(
            "geocode",
            "reverse_lookup",
            self.geocode.reverse_lookup(latitude, longitude),
        )
        .await
    }

    /// Purge all cached data: search results, pet details, and
    /// recommendations.
    pub fn clear_caches(&self) {
        self.search_cache.clear();
        self.details_cache.clear();
        self.recommendation_cache.clear();
    }
}

/// Time an upstream call and record request metrics.
async fn observe<T>(
    service: &'static str,
    operation: &'static str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    let start = Instant::now();
    let result = fut.await;
    let status = if result.is_ok() { "ok" } else { "error" };
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "service" => service,
        "operation" => operation,
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
        "service" => service,
        "operation" => operation,
    )
    .record(start.elapsed().as_secs_f64());
    result
}
