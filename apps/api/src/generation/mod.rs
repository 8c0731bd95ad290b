// Content generation: scored text variations for a prompt, then an image for the
// chosen post. All provider calls go through llm_client; audit writes through store.

pub mod audit;
pub mod handlers;
pub mod orchestrator;
