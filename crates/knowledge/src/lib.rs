//! Knowledge retrieval for MathMentor.
//!
//! Implements [`mathmentor_core::KnowledgeStore`] as a persisted vector index
//! over the bundled math reference document:
//!
//! - [`chunker`] — heading-aware document splitting
//! - [`vector`] — cosine similarity and ranking
//! - [`index`] — build/open the on-disk index and serve retrievals

pub mod chunker;
pub mod index;
pub mod vector;

pub use chunker::split_sections;
pub use index::VectorIndex;
pub use vector::cosine_similarity;
