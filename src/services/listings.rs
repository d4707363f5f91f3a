//! Pet-listings provider client.
//!
//! Talks to a Petfinder-style REST API: OAuth2 client-credentials token
//! endpoint, `/animals` search, `/animals/{id}` detail. The bearer token
//! is cached in-process and refreshed shortly before it expires.
//!
//! Multi-type searches issue one upstream query per requested type,
//! concurrently, then merge: deduplicate by id keeping the first
//! occurrence, sort by distance, sum the per-type totals. The summed
//! total can double-count a pet listed under more than one requested
//! type; the merged animal list itself is exact.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use super::retry::{RetryConfig, with_retry};
use super::traits::PetListingService;
use crate::types::{PetRecord, PetType, SearchResults};
use crate::{PetMatchError, Result};

/// Default base URL for the listings provider.
const DEFAULT_BASE_URL: &str = "https://api.petfinder.com/v2";

/// Maximum listings requested per upstream query.
const PAGE_LIMIT: u32 = 100;

/// Refresh the token this long before the provider-reported expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Client for the pet-listings API.
pub struct PetListingClient {
    client_id: String,
    client_secret: String,
    http: Client,
    base_url: String,
    retry: RetryConfig,
    token: tokio::sync::Mutex<Option<CachedToken>>,
}

impl PetListingClient {
    /// Create a client with the given API credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self::with_base_url(client_id, client_secret, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            http,
            base_url: base_url.into(),
            retry: RetryConfig::default(),
            token: tokio::sync::Mutex::new(None),
        }
    }

    /// Override the retry configuration.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Return a valid bearer token, fetching a fresh one if the cached
    /// token is absent or about to expire.
    async fn ensure_token(&self) -> Result<String> {
        let mut slot = self.token.lock().await;
        if let Some(cached) = slot.as_ref() {
            if cached.expires_at > Instant::now() + TOKEN_EXPIRY_MARGIN {
                return Ok(cached.access_token.clone());
            }
        }

        let url = format!("{}/oauth2/token", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&TokenRequest {
                grant_type: "client_credentials",
                client_id: &self.client_id,
                client_secret: &self.client_secret,
            })
            .send()
            .await
            .map_err(|e| PetMatchError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                400 | 401 | 403 => PetMatchError::AuthenticationFailed,
                code => PetMatchError::Api {
                    status: code,
                    message: format!("token request failed: {status}"),
                },
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PetMatchError::Http(e.to_string()))?;

        debug!(expires_in = token.expires_in, "refreshed listings token");
        let access_token = token.access_token.clone();
        *slot = Some(CachedToken {
            access_token: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(access_token)
    }

    /// One upstream search query, optionally filtered to a single type.
    async fn fetch_page(&self, postal_code: &str, pet_type: Option<PetType>) -> Result<TypePage> {
        let token = self.ensure_token().await?;

        let url = format!("{}/animals", self.base_url);
        let mut request = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .query(&[("location", postal_code)])
            .query(&[("limit", PAGE_LIMIT)])
            .query(&[("sort", "distance")]);
        if let Some(ty) = pet_type {
            request = request.query(&[("type", ty.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PetMatchError::Http(e.to_string()))?;
        handle_response_errors(&response)?;

        let body: AnimalsResponse = response
            .json()
            .await
            .map_err(|e| PetMatchError::Http(e.to_string()))?;

        Ok(TypePage {
            animals: body.animals.into_iter().map(PetRecord::from).collect(),
            total_count: body.pagination.total_count,
        })
    }
}

#[async_trait]
impl PetListingService for PetListingClient {
    async fn search(&self, postal_code: &str, types: &[PetType]) -> Result<SearchResults> {
        // No filter: a single untyped query.
        if types.is_empty() {
            let page = with_retry(&self.retry, "listings", "search", || {
                self.fetch_page(postal_code, None)
            })
            .await?;
            return Ok(merge_pages(vec![page]));
        }

        let pages = join_all(types.iter().map(|ty| {
            with_retry(&self.retry, "listings", "search", move || {
                self.fetch_page(postal_code, Some(*ty))
            })
        }))
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

        Ok(merge_pages(pages))
    }

    async fn get_by_id(&self, id: &str) -> Result<PetRecord> {
        with_retry(&self.retry, "listings", "get_by_id", || async {
            let token = self.ensure_token().await?;
            let url = format!("{}/animals/{}", self.base_url, id);

            let response = self
                .http
                .get(&url)
                .bearer_auth(&token)
                .send()
                .await
                .map_err(|e| PetMatchError::Http(e.to_string()))?;

            if response.status().as_u16() == 404 {
                return Err(PetMatchError::PetNotFound(id.to_string()));
            }
            handle_response_errors(&response)?;

            let body: AnimalResponse = response
                .json()
                .await
                .map_err(|e| PetMatchError::Http(e.to_string()))?;
            Ok(PetRecord::from(body.animal))
        })
        .await
    }
}

/// Results of one per-type query.
struct TypePage {
    animals: Vec<PetRecord>,
    total_count: u64,
}

/// Merge per-type pages: dedupe by id (first occurrence wins), sort by
/// distance with unknown distances last, sum totals.
fn merge_pages(pages: Vec<TypePage>) -> SearchResults {
    let mut total_count = 0u64;
    let mut seen = std::collections::HashSet::new();
    let mut animals = Vec::new();

    for page in pages {
        total_count += page.total_count;
        for animal in page.animals {
            if seen.insert(animal.id.clone()) {
                animals.push(animal);
            }
        }
    }

    animals.sort_by(|a, b| match (a.distance, b.distance) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    SearchResults {
        animals,
        total_count,
    }
}

/// Check response status and map to the appropriate error.
fn handle_response_errors(response: &reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    match status.as_u16() {
        401 => Err(PetMatchError::AuthenticationFailed),
        429 => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs);
            Err(PetMatchError::RateLimited { retry_after })
        }
        code => Err(PetMatchError::Api {
            status: code,
            message: format!("listings API error: {status}"),
        }),
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct AnimalsResponse {
    animals: Vec<WireAnimal>,
    pagination: WirePagination,
}

#[derive(Deserialize)]
struct AnimalResponse {
    animal: WireAnimal,
}

#[derive(Deserialize)]
struct WirePagination {
    total_count: u64,
}

#[derive(Deserialize)]
struct WireAnimal {
    id: u64,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    breeds: Option<WireBreeds>,
    age: Option<String>,
    size: Option<String>,
    gender: Option<String>,
    description: Option<String>,
    #[serde(default)]
    photos: Vec<WirePhoto>,
    distance: Option<f64>,
    #[serde(default)]
    tags: Vec<String>,
    url: Option<String>,
}

#[derive(Deserialize)]
struct WireBreeds {
    primary: Option<String>,
}

#[derive(Deserialize)]
struct WirePhoto {
    medium: Option<String>,
    large: Option<String>,
}

impl From<WireAnimal> for PetRecord {
    fn from(wire: WireAnimal) -> Self {
        let photo_url = wire
            .photos
            .into_iter()
            .next()
            .and_then(|p| p.medium.or(p.large));
        PetRecord {
            id: wire.id.to_string(),
            name: wire.name,
            kind: wire.kind,
            breed_primary: wire.breeds.and_then(|b| b.primary),
            age: wire.age,
            size: wire.size,
            gender: wire.gender,
            description: wire.description,
            photo_url,
            distance: wire.distance,
            tags: wire.tags,
            url: wire.url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, distance: Option<f64>) -> PetRecord {
        PetRecord {
            id: id.into(),
            name: format!("pet-{id}"),
            kind: "Dog".into(),
            breed_primary: None,
            age: None,
            size: None,
            gender: None,
            description: None,
            photo_url: None,
            distance,
            tags: vec![],
            url: None,
        }
    }

    #[test]
    fn merge_dedupes_by_id_keeping_first() {
        let merged = merge_pages(vec![
            TypePage {
                animals: vec![record("1", Some(2.0)), record("2", Some(5.0))],
                total_count: 2,
            },
            TypePage {
                animals: vec![record("2", Some(5.0)), record("3", Some(1.0))],
                total_count: 2,
            },
        ]);

        let ids: Vec<&str> = merged.animals.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
        // Summed totals double-count the shared pet; the list does not.
        assert_eq!(merged.total_count, 4);
    }

    #[test]
    fn merge_sorts_unknown_distances_last() {
        let merged = merge_pages(vec![TypePage {
            animals: vec![record("a", None), record("b", Some(3.5)), record("c", Some(0.5))],
            total_count: 3,
        }]);

        let ids: Vec<&str> = merged.animals.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }
}
