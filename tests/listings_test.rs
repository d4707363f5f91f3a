//! Wiremock integration tests for the listings client: token flow,
//! per-type merge, and error mapping.

use petmatch::services::PetListingClient;
use petmatch::types::PetType;
use petmatch::{PetListingService, PetMatchError, RetryConfig};
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token_response() -> serde_json::Value {
    serde_json::json!({
        "token_type": "Bearer",
        "expires_in": 3600,
        "access_token": "test_token"
    })
}

fn animal(id: u64, name: &str, kind: &str, distance: f64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "type": kind,
        "breeds": { "primary": "Labrador Retriever" },
        "age": "Young",
        "size": "Medium",
        "gender": "Female",
        "photos": [{ "medium": "https://example.test/photo.jpg", "large": null }],
        "distance": distance,
        "tags": ["Friendly", "Playful"],
        "url": "https://example.test/pet"
    })
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response()))
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> PetListingClient {
    PetListingClient::with_base_url("test_id", "test_secret", server.uri())
        .retry(RetryConfig::disabled())
}

#[tokio::test]
async fn search_maps_provider_records() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/animals"))
        .and(query_param("location", "90210"))
        .and(query_param("type", "dog"))
        .and(header("authorization", "Bearer test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "animals": [animal(74516502, "Bella", "Dog", 1.5)],
            "pagination": { "total_count": 1 }
        })))
        .mount(&server)
        .await;

    let results = client(&server)
        .search("90210", &[PetType::Dog])
        .await
        .expect("search should succeed");

    assert_eq!(results.total_count, 1);
    assert_eq!(results.animals.len(), 1);
    let pet = &results.animals[0];
    assert_eq!(pet.id, "74516502");
    assert_eq!(pet.name, "Bella");
    assert_eq!(pet.breed_primary.as_deref(), Some("Labrador Retriever"));
    assert_eq!(pet.photo_url.as_deref(), Some("https://example.test/photo.jpg"));
    assert_eq!(pet.distance, Some(1.5));
    assert_eq!(pet.tags, vec!["Friendly", "Playful"]);
}

#[tokio::test]
async fn empty_filter_issues_one_untyped_query() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/animals"))
        .and(query_param("location", "90210"))
        .and(query_param_is_missing("type"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "animals": [animal(1, "Bella", "Dog", 1.0)],
            "pagination": { "total_count": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = client(&server).search("90210", &[]).await.unwrap();
    assert_eq!(results.animals.len(), 1);
}

#[tokio::test]
async fn multi_type_search_merges_dedupes_and_sorts() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/animals"))
        .and(query_param("type", "dog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "animals": [animal(1, "Bella", "Dog", 5.0), animal(2, "Scout", "Dog", 1.0)],
            "pagination": { "total_count": 2 }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/animals"))
        .and(query_param("type", "cat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "animals": [animal(2, "Scout", "Dog", 1.0), animal(3, "Milo", "Cat", 0.5)],
            "pagination": { "total_count": 2 }
        })))
        .mount(&server)
        .await;

    let results = client(&server)
        .search("90210", &[PetType::Dog, PetType::Cat])
        .await
        .unwrap();

    let ids: Vec<&str> = results.animals.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["3", "2", "1"], "deduped and sorted by distance");
    // Totals are summed per type; the shared pet is counted twice.
    assert_eq!(results.total_count, 4);
}

#[tokio::test]
async fn token_is_fetched_once_across_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/animals"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "animals": [],
            "pagination": { "total_count": 0 }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server);
    client.search("90210", &[PetType::Dog]).await.unwrap();
    client.search("90210", &[PetType::Dog]).await.unwrap();
}

#[tokio::test]
async fn bad_credentials_fail_the_token_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client(&server).search("90210", &[PetType::Dog]).await;
    assert!(matches!(result, Err(PetMatchError::AuthenticationFailed)));
}

#[tokio::test]
async fn search_401_maps_to_authentication_failed() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/animals"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client(&server).search("90210", &[PetType::Dog]).await;
    assert!(matches!(result, Err(PetMatchError::AuthenticationFailed)));
}

#[tokio::test]
async fn search_429_maps_to_rate_limited_with_hint() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/animals"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&server)
        .await;

    let result = client(&server).search("90210", &[PetType::Dog]).await;
    match result {
        Err(PetMatchError::RateLimited { retry_after }) => {
            assert_eq!(retry_after, Some(std::time::Duration::from_secs(30)));
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn get_by_id_maps_the_record() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/animals/74516502"))
        .and(header("authorization", "Bearer test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "animal": animal(74516502, "Bella", "Dog", 1.5)
        })))
        .mount(&server)
        .await;

    let pet = client(&server).get_by_id("74516502").await.unwrap();
    assert_eq!(pet.id, "74516502");
    assert_eq!(pet.name, "Bella");
}

#[tokio::test]
async fn get_by_id_404_maps_to_pet_not_found() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/animals/999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    match client(&server).get_by_id("999").await {
        Err(PetMatchError::PetNotFound(id)) => assert_eq!(id, "999"),
        other => panic!("expected PetNotFound, got {other:?}"),
    }
}
