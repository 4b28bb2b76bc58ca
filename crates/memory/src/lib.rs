//! Memory store implementations for MathMentor.

pub mod file_store;
pub mod in_memory;
pub mod recall;

pub use file_store::FileStore;
pub use in_memory::InMemoryStore;
pub use recall::{NO_MATCH, most_relevant, recall};
