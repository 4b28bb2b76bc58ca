//! Persisted vector index over the reference document.
//!
//! The index is built once (chunk, embed, write to disk) and loaded on later
//! runs without re-embedding. On disk it is a JSONL file of
//! [`KnowledgeChunk`] records under the configured index directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use mathmentor_core::{
    EmbeddingRequest, KnowledgeChunk, KnowledgeError, KnowledgeStore, Provider, ProviderError,
};
use tracing::{debug, info, warn};

use crate::chunker::split_sections;
use crate::vector;

const CHUNKS_FILE: &str = "chunks.jsonl";

/// Similarity-search index over the embedded reference document.
///
/// Holds all chunks in memory; the on-disk file exists so the embedding cost
/// is paid once, not on every process start.
pub struct VectorIndex {
    provider: Arc<dyn Provider>,
    embedding_model: String,
    chunks: Vec<KnowledgeChunk>,
}

impl VectorIndex {
    /// Returns true when a built index is present under `index_dir`.
    pub fn exists(index_dir: &Path) -> bool {
        index_dir.join(CHUNKS_FILE).exists()
    }

    /// Loads a previously built index from `index_dir`.
    pub fn open(
        provider: Arc<dyn Provider>,
        embedding_model: impl Into<String>,
        index_dir: &Path,
    ) -> Result<Self, KnowledgeError> {
        let path = index_dir.join(CHUNKS_FILE);
        let contents = fs::read_to_string(&path).map_err(|e| {
            KnowledgeError::Storage(format!("failed to read {}: {e}", path.display()))
        })?;

        let mut chunks = Vec::new();
        for (line_no, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<KnowledgeChunk>(line) {
                Ok(chunk) => chunks.push(chunk),
                Err(e) => {
                    warn!(line = line_no + 1, error = %e, "skipping corrupted index line");
                }
            }
        }

        debug!(chunks = chunks.len(), path = %path.display(), "knowledge index loaded");
        Ok(Self {
            provider,
            embedding_model: embedding_model.into(),
            chunks,
        })
    }

    /// Chunks and embeds `source_text`, then persists the index to `index_dir`.
    pub async fn build(
        provider: Arc<dyn Provider>,
        embedding_model: impl Into<String>,
        source_text: &str,
        chunk_size: usize,
        index_dir: &Path,
    ) -> Result<Self, KnowledgeError> {
        let embedding_model = embedding_model.into();
        let texts = split_sections(source_text, chunk_size);
        if texts.is_empty() {
            return Err(KnowledgeError::EmptyIndex);
        }

        let response = provider
            .embed(EmbeddingRequest::new(&embedding_model, texts.clone()))
            .await?;
        if response.embeddings.len() != texts.len() {
            return Err(KnowledgeError::Embedding(ProviderError::InvalidResponse(
                format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    response.embeddings.len()
                ),
            )));
        }

        let chunks: Vec<KnowledgeChunk> = texts
            .into_iter()
            .zip(response.embeddings)
            .map(|(text, embedding)| KnowledgeChunk { text, embedding })
            .collect();

        fs::create_dir_all(index_dir).map_err(|e| {
            KnowledgeError::Storage(format!("failed to create {}: {e}", index_dir.display()))
        })?;
        let path = index_dir.join(CHUNKS_FILE);
        let mut lines = String::new();
        for chunk in &chunks {
            let line = serde_json::to_string(chunk)
                .map_err(|e| KnowledgeError::Storage(format!("failed to serialize chunk: {e}")))?;
            lines.push_str(&line);
            lines.push('\n');
        }
        fs::write(&path, lines).map_err(|e| {
            KnowledgeError::Storage(format!("failed to write {}: {e}", path.display()))
        })?;

        info!(chunks = chunks.len(), path = %path.display(), "knowledge index built");
        Ok(Self {
            provider,
            embedding_model,
            chunks,
        })
    }

    /// Opens the index if one is already built, otherwise builds it from the
    /// reference document at `source_path`.
    pub async fn open_or_build(
        provider: Arc<dyn Provider>,
        embedding_model: impl Into<String>,
        index_dir: &Path,
        source_path: &Path,
        chunk_size: usize,
    ) -> Result<Self, KnowledgeError> {
        if Self::exists(index_dir) {
            return Self::open(provider, embedding_model, index_dir);
        }
        let source_text = fs::read_to_string(source_path)
            .map_err(|_| KnowledgeError::SourceMissing(source_path.display().to_string()))?;
        Self::build(provider, embedding_model, &source_text, chunk_size, index_dir).await
    }
}

#[async_trait]
impl KnowledgeStore for VectorIndex {
    fn name(&self) -> &str {
        "vector-index"
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<String, KnowledgeError> {
        if self.chunks.is_empty() {
            return Err(KnowledgeError::EmptyIndex);
        }

        let response = self
            .provider
            .embed(EmbeddingRequest::new(
                &self.embedding_model,
                vec![query.to_string()],
            ))
            .await?;
        let query_embedding = response.embeddings.into_iter().next().ok_or_else(|| {
            KnowledgeError::Embedding(ProviderError::InvalidResponse(
                "no query embedding returned".to_string(),
            ))
        })?;

        let ranked = vector::rank(&self.chunks, &query_embedding, k);
        Ok(ranked
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn chunk_count(&self) -> Result<usize, KnowledgeError> {
        Ok(self.chunks.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathmentor_core::{CompletionRequest, CompletionResponse, EmbeddingResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const SOURCE: &str = "## Algebra\nThe quadratic formula solves ax^2 + bx + c = 0.\n## Calculus\nThe power rule differentiates x^n.\n## Geometry\nThe Pythagorean theorem relates triangle sides.";

    /// Deterministic embedder: maps texts onto fixed axes by keyword so
    /// similarity rankings are predictable.
    struct StubEmbedder {
        embed_calls: Arc<AtomicUsize>,
    }

    impl StubEmbedder {
        fn new() -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Arc::new(Self {
                    embed_calls: calls.clone(),
                }),
                calls,
            )
        }

        fn embedding_for(text: &str) -> Vec<f32> {
            if text.contains("Algebra") || text.contains("quadratic") {
                vec![1.0, 0.0, 0.0]
            } else if text.contains("Calculus") || text.contains("derivative") {
                vec![0.0, 1.0, 0.0]
            } else if text.contains("Geometry") {
                vec![0.0, 0.0, 1.0]
            } else {
                vec![0.5, 0.5, 0.5]
            }
        }
    }

    #[async_trait]
    impl Provider for StubEmbedder {
        fn name(&self) -> &str {
            "stub-embedder"
        }

        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, ProviderError> {
            Err(ProviderError::NotConfigured(
                "stub embedder does not complete".to_string(),
            ))
        }

        async fn embed(
            &self,
            request: EmbeddingRequest,
        ) -> Result<EmbeddingResponse, ProviderError> {
            self.embed_calls.fetch_add(1, Ordering::SeqCst);
            Ok(EmbeddingResponse {
                embeddings: request
                    .inputs
                    .iter()
                    .map(|text| Self::embedding_for(text))
                    .collect(),
                model: request.model,
            })
        }
    }

    #[tokio::test]
    async fn build_writes_index_to_disk() {
        let dir = TempDir::new().unwrap();
        let (provider, _) = StubEmbedder::new();

        let index = VectorIndex::build(provider, "embed-model", SOURCE, 80, dir.path())
            .await
            .unwrap();

        assert!(VectorIndex::exists(dir.path()));
        assert_eq!(index.chunk_count().await.unwrap(), 3);
        let contents = fs::read_to_string(dir.path().join(CHUNKS_FILE)).unwrap();
        assert_eq!(contents.lines().count(), 3);
    }

    #[tokio::test]
    async fn open_loads_index_without_re_embedding() {
        let dir = TempDir::new().unwrap();
        let (builder, _) = StubEmbedder::new();
        VectorIndex::build(builder, "embed-model", SOURCE, 80, dir.path())
            .await
            .unwrap();

        let (reader, calls) = StubEmbedder::new();
        let index = VectorIndex::open(reader, "embed-model", dir.path()).unwrap();
        assert_eq!(index.chunk_count().await.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        index.retrieve("what is the derivative of x^2", 2).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn open_or_build_embeds_only_once() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("reference.md");
        fs::write(&source, SOURCE).unwrap();
        let index_dir = dir.path().join("index");
        let (provider, calls) = StubEmbedder::new();

        VectorIndex::open_or_build(provider.clone(), "embed-model", &index_dir, &source, 80)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        VectorIndex::open_or_build(provider, "embed-model", &index_dir, &source, 80)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retrieve_ranks_by_similarity() {
        let dir = TempDir::new().unwrap();
        let (provider, _) = StubEmbedder::new();
        let index = VectorIndex::build(provider, "embed-model", SOURCE, 80, dir.path())
            .await
            .unwrap();

        let context = index
            .retrieve("what is the derivative of x^2", 2)
            .await
            .unwrap();
        assert!(context.starts_with("## Calculus"));
        assert_eq!(context.lines().filter(|l| l.starts_with("## ")).count(), 2);
    }

    #[tokio::test]
    async fn retrieve_caps_results_at_k() {
        let dir = TempDir::new().unwrap();
        let (provider, _) = StubEmbedder::new();
        let index = VectorIndex::build(provider, "embed-model", SOURCE, 80, dir.path())
            .await
            .unwrap();

        let context = index
            .retrieve("what is the derivative of x^2", 1)
            .await
            .unwrap();
        assert!(context.contains("Calculus"));
        assert!(!context.contains("Algebra"));
        assert!(!context.contains("Geometry"));
    }

    #[tokio::test]
    async fn missing_source_is_a_clear_error() {
        let dir = TempDir::new().unwrap();
        let (provider, _) = StubEmbedder::new();

        let result = VectorIndex::open_or_build(
            provider,
            "embed-model",
            &dir.path().join("index"),
            &dir.path().join("nowhere.md"),
            80,
        )
        .await;
        assert!(matches!(result, Err(KnowledgeError::SourceMissing(_))));
    }

    #[tokio::test]
    async fn empty_source_cannot_build() {
        let dir = TempDir::new().unwrap();
        let (provider, _) = StubEmbedder::new();

        let result = VectorIndex::build(provider, "embed-model", "  \n ", 80, dir.path()).await;
        assert!(matches!(result, Err(KnowledgeError::EmptyIndex)));
    }

    #[tokio::test]
    async fn open_skips_corrupted_lines() {
        let dir = TempDir::new().unwrap();
        let good = serde_json::to_string(&KnowledgeChunk {
            text: "## Algebra\nfacts".to_string(),
            embedding: vec![1.0, 0.0, 0.0],
        })
        .unwrap();
        fs::write(
            dir.path().join(CHUNKS_FILE),
            format!("{good}\nnot json at all\n"),
        )
        .unwrap();

        let (provider, _) = StubEmbedder::new();
        let index = VectorIndex::open(provider, "embed-model", dir.path()).unwrap();
        assert_eq!(index.chunk_count().await.unwrap(), 1);
    }
}
