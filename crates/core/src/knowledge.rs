//! Knowledge trait — the read-only reference index.
//!
//! Chunks of a reference document are embedded once at build time and then
//! served by similarity search. The store is never written to outside a
//! build/rebuild, so concurrent readers need no coordination.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::KnowledgeError;

/// One embedded fragment of the reference document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    /// The chunk text, including its section heading
    pub text: String,

    /// The embedding vector for similarity search
    pub embedding: Vec<f32>,
}

/// The core KnowledgeStore trait.
///
/// `retrieve` embeds the query, ranks chunks by cosine similarity, and
/// returns the top-`k` chunk texts joined with newlines.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// The store name (e.g., "vector-index").
    fn name(&self) -> &str;

    /// Nearest-neighbor retrieval; the result is the concatenated context
    /// handed verbatim to the solving stage.
    async fn retrieve(&self, query: &str, k: usize)
        -> std::result::Result<String, KnowledgeError>;

    /// How many chunks the index holds.
    async fn chunk_count(&self) -> std::result::Result<usize, KnowledgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knowledge_chunk_serialization() {
        let chunk = KnowledgeChunk {
            text: "## Algebra\nA linear equation has the form ax + b = 0.".into(),
            embedding: vec![0.1, 0.2, 0.3],
        };
        let json = serde_json::to_string(&chunk).unwrap();
        let back: KnowledgeChunk = serde_json::from_str(&json).unwrap();
        assert_eq!(back.embedding.len(), 3);
        assert!(back.text.starts_with("## Algebra"));
    }
}
