//! Tests for the client facade: cache-then-network flows, validation,
//! and the cache purge.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use petmatch::cache::MemoryStore;
use petmatch::types::{CandidatePet, PetRecord, PetType, PostalArea, SearchResults};
use petmatch::{
    CompletionService, GeocodeService, PetListingService, PetMatch, PetMatchClient, PetMatchError,
    Result,
};

const RESPONSE: &str = "I recommend Bella.\n\nBella is friendly and affectionate.\n\n\
                        Affectionate: 85%\nPlayfulness: 80%";

fn record(id: &str, name: &str, distance: Option<f64>) -> PetRecord {
    PetRecord {
        id: id.into(),
        name: name.into(),
        kind: "Dog".into(),
        breed_primary: Some("Beagle".into()),
        age: Some("Young".into()),
        size: None,
        gender: Some("Female".into()),
        description: None,
        photo_url: None,
        distance,
        tags: vec!["Friendly".into()],
        url: None,
    }
}

#[derive(Default)]
struct FakeListings {
    searches: AtomicUsize,
    detail_fetches: AtomicUsize,
}

#[async_trait]
impl PetListingService for FakeListings {
    async fn search(&self, _postal_code: &str, _types: &[PetType]) -> Result<SearchResults> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        Ok(SearchResults {
            animals: vec![record("1", "Bella", Some(1.0)), record("2", "Max", Some(2.0))],
            total_count: 2,
        })
    }

    async fn get_by_id(&self, id: &str) -> Result<PetRecord> {
        self.detail_fetches.fetch_add(1, Ordering::SeqCst);
        if id == "missing" {
            return Err(PetMatchError::PetNotFound(id.to_string()));
        }
        Ok(record(id, "Bella", Some(1.0)))
    }
}

struct FakeCompletion {
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RESPONSE.to_string())
    }
}

struct FakeGeocode;

#[async_trait]
impl GeocodeService for FakeGeocode {
    async fn reverse_lookup(&self, latitude: f64, _longitude: f64) -> Result<Option<PostalArea>> {
        if latitude == 0.0 {
            return Ok(None);
        }
        Ok(Some(PostalArea {
            postal_code: "90210".into(),
            country_code: "US".into(),
        }))
    }
}

struct Harness {
    client: PetMatchClient,
    listings: Arc<FakeListings>,
    completion: Arc<FakeCompletion>,
}

fn harness() -> Harness {
    let listings = Arc::new(FakeListings::default());
    let completion = Arc::new(FakeCompletion {
        calls: AtomicUsize::new(0),
    });

    let client = PetMatch::builder()
        .listing_service(Arc::clone(&listings) as Arc<dyn PetListingService>)
        .completion_service(Arc::clone(&completion) as Arc<dyn CompletionService>)
        .geocode_service(Arc::new(FakeGeocode))
        .durable_store(Arc::new(MemoryStore::new()))
        .build()
        .expect("builder should succeed");

    Harness {
        client,
        listings,
        completion,
    }
}

fn candidates() -> Vec<CandidatePet> {
    vec![
        CandidatePet::from_record(&record("1", "Bella", Some(1.0))),
        CandidatePet::from_record(&record("2", "Max", Some(2.0))),
    ]
}

// =========================================================================
// Search
// =========================================================================

#[tokio::test]
async fn search_caches_results_within_ttl() {
    let h = harness();

    let first = h.client.search("90210", &["dog"]).await.unwrap();
    assert_eq!(h.listings.searches.load(Ordering::SeqCst), 1);

    let second = h.client.search("90210", &["dog"]).await.unwrap();
    assert_eq!(h.listings.searches.load(Ordering::SeqCst), 1);
    assert_eq!(second, first);
}

#[tokio::test]
async fn search_cache_key_ignores_filter_order_and_case() {
    let h = harness();

    h.client.search("90210", &["Dog", "cat"]).await.unwrap();
    h.client.search("90210", &["cats", "dog"]).await.unwrap();

    assert_eq!(
        h.listings.searches.load(Ordering::SeqCst),
        1,
        "reordered filter must hit the same cache entry"
    );
}

#[tokio::test]
async fn different_postal_codes_search_separately() {
    let h = harness();

    h.client.search("90210", &["dog"]).await.unwrap();
    h.client.search("10001", &["dog"]).await.unwrap();

    assert_eq!(h.listings.searches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn search_rejects_malformed_postal_codes() {
    let h = harness();

    for bad in ["", "1234", "123456", "9021a"] {
        let result = h.client.search(bad, &["dog"]).await;
        assert!(
            matches!(result, Err(PetMatchError::InvalidPostalCode(_))),
            "{bad:?} should be rejected"
        );
    }
    assert_eq!(h.listings.searches.load(Ordering::SeqCst), 0);
}

// =========================================================================
// Pet details
// =========================================================================

#[tokio::test]
async fn pet_details_cache_then_network() {
    let h = harness();

    let first = h.client.pet_details("1").await.unwrap();
    let second = h.client.pet_details("1").await.unwrap();
    assert_eq!(h.listings.detail_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(second, first);

    h.client.pet_details("2").await.unwrap();
    assert_eq!(h.listings.detail_fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn unknown_pet_id_propagates_not_found() {
    let h = harness();

    let result = h.client.pet_details("missing").await;
    assert!(matches!(result, Err(PetMatchError::PetNotFound(_))));

    // Failures are not cached; the next call asks upstream again.
    let _ = h.client.pet_details("missing").await;
    assert_eq!(h.listings.detail_fetches.load(Ordering::SeqCst), 2);
}

// =========================================================================
// Recommendations
// =========================================================================

#[tokio::test]
async fn recommendation_is_cached_until_refreshed() {
    let h = harness();

    let first = h
        .client
        .recommendation("90210", &["dog"], &candidates())
        .await
        .unwrap();
    assert_eq!(h.completion.calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.pet_id.as_deref(), Some("1"));
    assert_eq!(first.pet_name, "Bella");

    let cached = h
        .client
        .recommendation("90210", &["dog"], &candidates())
        .await
        .unwrap();
    assert_eq!(h.completion.calls.load(Ordering::SeqCst), 1);
    assert_eq!(cached, first);

    h.client
        .refresh_recommendation("90210", &["dog"], &candidates())
        .await
        .unwrap();
    assert_eq!(h.completion.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn recommendation_requires_candidates() {
    let h = harness();

    let result = h.client.recommendation("90210", &["dog"], &[]).await;
    assert!(matches!(result, Err(PetMatchError::NoCandidates)));
    assert_eq!(h.completion.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn recommendation_validates_the_postal_code() {
    let h = harness();

    let result = h.client.recommendation("nope", &["dog"], &candidates()).await;
    assert!(matches!(result, Err(PetMatchError::InvalidPostalCode(_))));
}

// =========================================================================
// Geolocation
// =========================================================================

#[tokio::test]
async fn locate_resolves_through_the_geocode_service() {
    let h = harness();

    let area = h.client.locate(34.09, -118.4).await.unwrap().unwrap();
    assert_eq!(area.postal_code, "90210");

    let nowhere = h.client.locate(0.0, 0.0).await.unwrap();
    assert!(nowhere.is_none());
}

// =========================================================================
// Cache purge
// =========================================================================

#[tokio::test]
async fn clear_caches_purges_all_three_namespaces() {
    let h = harness();

    h.client.search("90210", &["dog"]).await.unwrap();
    h.client.pet_details("1").await.unwrap();
    h.client
        .recommendation("90210", &["dog"], &candidates())
        .await
        .unwrap();

    h.client.clear_caches();

    h.client.search("90210", &["dog"]).await.unwrap();
    h.client.pet_details("1").await.unwrap();
    h.client
        .recommendation("90210", &["dog"], &candidates())
        .await
        .unwrap();

    assert_eq!(h.listings.searches.load(Ordering::SeqCst), 2);
    assert_eq!(h.listings.detail_fetches.load(Ordering::SeqCst), 2);
    assert_eq!(h.completion.calls.load(Ordering::SeqCst), 2);
}

// =========================================================================
// Builder validation
// =========================================================================

#[test]
fn builder_requires_a_listing_service() {
    let result = PetMatch::builder().completion_key("key").build();
    assert!(matches!(result, Err(PetMatchError::Configuration(_))));
}

#[test]
fn builder_requires_a_completion_service() {
    let result = PetMatch::builder()
        .listing_credentials("id", "secret")
        .build();
    assert!(matches!(result, Err(PetMatchError::Configuration(_))));
}

#[test]
fn builder_with_credentials_builds() {
    let result = PetMatch::builder()
        .listing_credentials("id", "secret")
        .completion_key("key")
        .durable_store(Arc::new(MemoryStore::new()))
        .build();
    assert!(result.is_ok());
}
