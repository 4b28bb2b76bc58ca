//! # MathMentor Core
//!
//! The shared vocabulary of the workspace: problem and result types, the
//! `Provider`/`MemoryStore`/`KnowledgeStore` traits, and the error taxonomy.
//! Every other crate depends inward on this one and on nothing heavier —
//! there is no HTTP, no filesystem, no async runtime here beyond the trait
//! signatures themselves.
//!
//! Subsystems are traits at this layer so the pipeline can run against the
//! real Gemini client in production and scripted stand-ins in tests without
//! either knowing the difference.

pub mod error;
pub mod knowledge;
pub mod memory;
pub mod problem;
pub mod provider;
pub mod result;

// Re-export key types at crate root for ergonomics
pub use error::{Error, KnowledgeError, MemoryError, ProviderError, Result};
pub use knowledge::{KnowledgeChunk, KnowledgeStore};
pub use memory::{Feedback, MemoryRecord, MemoryStore, NewRecord};
pub use problem::{ParsedProblem, RouteDecision};
pub use provider::{
    CompletionRequest, CompletionResponse, EmbeddingRequest, EmbeddingResponse, MediaInput,
    Provider, Transcriber,
};
pub use result::{PipelineResult, PipelineStatus, Verdict};
