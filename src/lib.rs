//! Petmatch - caching and recommendation core for pet-adoption discovery
//!
//! This crate fronts a pet-listings provider and a text-completion
//! provider with a TTL cache, and turns free-form generated prose into a
//! structured, bounded recommendation. Searches, pet details, and
//! recommendations all follow cache-then-network; recommendations are
//! single-flight per search context, so concurrent requests share one
//! upstream generation.
//!
//! # Example
//!
//! ```rust,no_run
//! use petmatch::PetMatch;
//!
//! #[tokio::main]
//! async fn main() -> petmatch::Result<()> {
//!     let client = PetMatch::builder()
//!         .listing_credentials("client-id", "client-secret")
//!         .completion_key("sk-your-key")
//!         .build()?;
//!
//!     let results = client.search("90210", &["dogs", "Cat"]).await?;
//!     println!("{} pets nearby", results.total_count);
//!
//!     let candidates: Vec<_> = results
//!         .animals
//!         .iter()
//!         .map(petmatch::CandidatePet::from_record)
//!         .collect();
//!     let pick = client.recommendation("90210", &["dogs", "Cat"], &candidates).await?;
//!     println!("{}: {}", pick.pet_name, pick.match_reason);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod gateway;
pub mod recommend;
pub mod services;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use error::{PetMatchError, Result};
pub use gateway::{PetMatch, PetMatchBuilder, PetMatchClient};
pub use recommend::{Recommender, parse};
pub use services::{CompletionService, GeocodeService, PetListingService, RetryConfig};

// Re-export all types
pub use cache::CacheConfig;
pub use types::{
    CandidatePet, MAX_STATS, PetRecord, PetType, PostalArea, Recommendation, SearchResults, Stat,
    is_valid_postal_code,
};
