//! Client facade and builder.

mod builder;
mod client;

pub use builder::{PetMatch, PetMatchBuilder};
pub use client::PetMatchClient;
