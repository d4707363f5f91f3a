//! Clients for the upstream services.
//!
//! Three collaborators, each behind an object-safe trait so orchestration
//! can be tested with fakes:
//!
//! - [`PetListingClient`] — pet-listings provider (OAuth2 token flow,
//!   per-type search with merge/dedupe/sort, detail fetch).
//! - [`CompletionClient`] — generative text completions.
//! - [`GeocodeClient`] — coordinates to postal area.
//!
//! Transient upstream failures retry with backoff via [`RetryConfig`].

mod completion;
mod geocode;
mod listings;
mod retry;
mod traits;

pub use completion::CompletionClient;
pub use geocode::GeocodeClient;
pub use listings::PetListingClient;
pub use retry::RetryConfig;
pub use traits::{CompletionService, GeocodeService, PetListingService};
