//! Recommendation orchestration: cache, single-flight, generation.
//!
//! The flow for one `(postal code, type set)` key is cache-then-network:
//! a valid cached recommendation short-circuits the upstream call; on a
//! miss the orchestrator prompts the completion service, parses the raw
//! text, and writes the result to the long-TTL cache before returning it.
//!
//! Concurrent requests for the same key join one in-flight generation
//! through a registry of shared pending-result handles — at most one
//! upstream call is ever in flight per key. Failures are delivered to
//! every joiner but never cached; the next request starts a fresh flight.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::cache::{TtlCache, key};
use crate::services::CompletionService;
use crate::telemetry;
use crate::types::{CandidatePet, PetType, Recommendation};
use crate::{PetMatchError, Result};

use super::parser;
use super::prompt::{SYSTEM_INSTRUCTION, build_prompt};

/// Outcome stored in a flight handle once generation completes.
type FlightResult = std::result::Result<Recommendation, Arc<PetMatchError>>;

/// Shared pending-result handle for one key's in-flight generation.
type Flight = Arc<OnceCell<FlightResult>>;

/// Produces and caches recommendations.
pub struct Recommender {
    completion: Arc<dyn CompletionService>,
    cache: TtlCache,
    in_flight: Mutex<HashMap<String, Flight>>,
}

impl Recommender {
    /// Create a recommender writing to the given (long-TTL) cache.
    pub fn new(completion: Arc<dyn CompletionService>, cache: TtlCache) -> Self {
        Self {
            completion,
            cache,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Return a recommendation for the search context, generating one if
    /// the cache has no valid entry (or `force_refresh` is set).
    ///
    /// `selected_types` is the normalized filter; empty means "no filter"
    /// and prompts across all known types. Refuses an empty candidate
    /// list without calling upstream.
    pub async fn get_or_refresh(
        &self,
        postal_code: &str,
        selected_types: &[PetType],
        candidates: &[CandidatePet],
        force_refresh: bool,
    ) -> Result<Recommendation> {
        if candidates.is_empty() {
            return Err(PetMatchError::NoCandidates);
        }

        let cache_key = key::recommendation_key(postal_code, selected_types);

        if !force_refresh {
            if let Some(cached) = self.cache.get::<Recommendation>(&cache_key) {
                debug!(key = %cache_key, "serving cached recommendation");
                return Ok(cached);
            }
        }

        let flight = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight
                .entry(cache_key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let outcome = flight
            .get_or_init(|| async {
                self.generate(postal_code, selected_types, candidates, &cache_key)
                    .await
                    .map_err(Arc::new)
            })
            .await
            .clone();

        // The flight is done; drop the handle so the next request (e.g.
        // after expiry or a failure) starts fresh.
        self.in_flight.lock().await.remove(&cache_key);

        outcome.map_err(|e| duplicate_error(&e))
    }

    /// One generation: prompt, complete, parse, cache.
    async fn generate(
        &self,
        postal_code: &str,
        selected_types: &[PetType],
        candidates: &[CandidatePet],
        cache_key: &str,
    ) -> Result<Recommendation> {
        // An unfiltered search implies openness to any type.
        let prompt_types: &[PetType] = if selected_types.is_empty() {
            &PetType::ALL
        } else {
            selected_types
        };

        let prompt = build_prompt(postal_code, prompt_types, candidates);

        let start = std::time::Instant::now();
        let completed = self.completion.complete(SYSTEM_INSTRUCTION, &prompt).await;
        let status = if completed.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "service" => "completion",
            "operation" => "complete",
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "service" => "completion",
            "operation" => "complete",
        )
        .record(start.elapsed().as_secs_f64());

        let raw = completed?;
        if raw.trim().is_empty() {
            return Err(PetMatchError::EmptyResponse);
        }

        let recommendation = parser::parse(&raw, candidates);
        self.cache.set(cache_key, &recommendation);
        debug!(key = %cache_key, pet = %recommendation.pet_name, "generated recommendation");
        Ok(recommendation)
    }

    /// Remove every cached recommendation.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// Re-materialize a shared flight error for one caller.
///
/// `serde_json::Error` is not cloneable, so that variant degrades to its
/// message; every other variant is reproduced exactly.
fn duplicate_error(e: &PetMatchError) -> PetMatchError {
    use PetMatchError::*;
    match e {
        Http(m) => Http(m.clone()),
        Api { status, message } => Api {
            status: *status,
            message: message.clone(),
        },
        RateLimited { retry_after } => RateLimited {
            retry_after: *retry_after,
        },
        AuthenticationFailed => AuthenticationFailed,
        PetNotFound(id) => PetNotFound(id.clone()),
        Json(e) => Http(format!("JSON error: {e}")),
        EmptyResponse => EmptyResponse,
        InvalidPostalCode(c) => InvalidPostalCode(c.clone()),
        NoCandidates => NoCandidates,
        Configuration(m) => Configuration(m.clone()),
    }
}
