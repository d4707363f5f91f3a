//! Public types for the petmatch API.

mod geo;
mod pet;
mod recommendation;

pub use geo::{PostalArea, is_valid_postal_code};
pub use pet::{CandidatePet, PetRecord, PetType, SearchResults};
pub use recommendation::{MAX_STATS, Recommendation, Stat};
