//! Service traits for the upstream collaborators.
//!
//! The orchestration layer depends on these seams rather than on the
//! concrete HTTP clients, so tests can drive it with in-memory fakes and
//! deployments can swap providers without touching the core.

use async_trait::async_trait;

use crate::Result;
use crate::types::{PetRecord, PetType, PostalArea, SearchResults};

/// The pet-listings provider.
#[async_trait]
pub trait PetListingService: Send + Sync {
    /// Search adoptable pets near a postal code.
    ///
    /// An empty `types` slice means no type filter. With multiple types the
    /// implementation issues one upstream query per type and merges the
    /// results: deduplicated by id, sorted by distance, totals summed.
    async fn search(&self, postal_code: &str, types: &[PetType]) -> Result<SearchResults>;

    /// Fetch one pet record by id. Unknown ids fail with
    /// [`PetMatchError::PetNotFound`](crate::PetMatchError::PetNotFound).
    async fn get_by_id(&self, id: &str) -> Result<PetRecord>;
}

/// The generative text-completion provider.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Run one completion and return the raw generated text.
    ///
    /// Auth failures are reported as
    /// [`PetMatchError::AuthenticationFailed`](crate::PetMatchError::AuthenticationFailed)
    /// so callers can distinguish credential problems from content
    /// problems; an empty completion is
    /// [`PetMatchError::EmptyResponse`](crate::PetMatchError::EmptyResponse).
    async fn complete(&self, system_instruction: &str, prompt: &str) -> Result<String>;
}

/// Coordinates-to-postal-area resolution.
#[async_trait]
pub trait GeocodeService: Send + Sync {
    /// Resolve coordinates to a postal area. `None` when the location
    /// cannot be resolved — that is an answer, not an error.
    async fn reverse_lookup(&self, latitude: f64, longitude: f64) -> Result<Option<PostalArea>>;
}
