//! Prompt construction for the recommendation request.
//!
//! The system instruction pins the response shape the parser expects: one
//! "I recommend {name}." sentence, a short justification, and up to three
//! "Label: NN%" lines. Keep the two modules in sync when changing either.

use crate::types::{CandidatePet, PetType};

/// At most this many candidates are listed in the prompt.
pub const MAX_PROMPT_CANDIDATES: usize = 10;

/// Fixed system instruction for the completion service.
pub const SYSTEM_INSTRUCTION: &str = "You are a pet-adoption advisor. Pick exactly one pet from \
the numbered list; never invent a pet that is not listed. Start your answer with the sentence \
\"I recommend {name}.\" using the pet's exact listed name. Follow with one to three sentences \
explaining why that pet fits the visitor. Finish with up to three lines of the form \
\"Label: NN%\" rating the match (for example \"Compatibility: 85%\").";

/// Build the user prompt: the search context plus a numbered candidate
/// list with the fields the advisor should weigh.
pub fn build_prompt(postal_code: &str, types: &[PetType], candidates: &[CandidatePet]) -> String {
    let wanted = types
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(" or ");

    let mut prompt = format!(
        "A visitor near {postal_code} wants to adopt a {wanted}. \
         These pets are available nearby:\n\n"
    );

    for (i, pet) in candidates.iter().take(MAX_PROMPT_CANDIDATES).enumerate() {
        prompt.push_str(&format!(
            "{}. {} (id {}) — {}, {}, {}, {}, {}",
            i + 1,
            pet.name,
            pet.id,
            pet.kind,
            pet.breed_primary,
            pet.age,
            pet.size,
            pet.gender,
        ));
        if !pet.traits.is_empty() {
            prompt.push_str(&format!(". Traits: {}", pet.traits.join(", ")));
        }
        prompt.push('\n');
    }

    prompt.push_str("\nWhich one is the best match for this visitor?");
    prompt
}
