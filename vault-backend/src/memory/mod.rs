//! Persistent concept memory across conversations

pub mod concepts;
pub mod models;
pub mod store;

pub use concepts::extract_concepts;
pub use models::*;
pub use store::ConceptMemory;
