//! In-memory embedding index over resume chunks.
//!
//! Ranking is plain cosine similarity between the query embedding and every
//! stored chunk embedding. Resumes are a handful of chunks, so a linear scan
//! is all that is needed.

use std::cmp::Ordering;

use async_trait::async_trait;
use tracing::debug;

use crate::llm_client::{LlmClient, LlmError};

/// Produces one embedding per input text, in input order.
///
/// Carried in `AppState` as `Arc<dyn Embedder>` so tests can swap in a
/// deterministic embedder.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

#[async_trait]
impl Embedder for LlmClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        LlmClient::embed(self, texts).await
    }
}

#[derive(Debug, Clone)]
struct IndexedPassage {
    text: String,
    embedding: Vec<f32>,
}

/// Owned by one question-generation request; dropped with it.
#[derive(Debug, Clone, Default)]
pub struct ResumeIndex {
    entries: Vec<IndexedPassage>,
}

impl ResumeIndex {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embeds and stores `chunks`. Blank chunks are skipped.
    pub async fn add_documents(
        &mut self,
        embedder: &dyn Embedder,
        chunks: Vec<String>,
    ) -> Result<(), LlmError> {
        let chunks: Vec<String> = chunks
            .into_iter()
            .filter(|c| !c.trim().is_empty())
            .collect();
        if chunks.is_empty() {
            return Ok(());
        }

        let embeddings = embedder.embed(&chunks).await?;
        debug!("Indexed {} resume chunks", embeddings.len());

        self.entries.extend(
            chunks
                .into_iter()
                .zip(embeddings)
                .map(|(text, embedding)| IndexedPassage { text, embedding }),
        );
        Ok(())
    }

    /// Returns up to `k` chunk texts, most similar first.
    /// An empty index answers without calling the embedder.
    pub async fn query(
        &self,
        embedder: &dyn Embedder,
        query: &str,
        k: usize,
    ) -> Result<Vec<String>, LlmError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyContent)?;

        let mut scored: Vec<(f32, &str)> = self
            .entries
            .iter()
            .map(|e| (cosine_similarity(&query_embedding, &e.embedding), e.text.as_str()))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, text)| text.to_string())
            .collect())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    use super::*;

    /// Embeds text as keyword counts over a tiny fixed vocabulary.
    #[derive(Default)]
    pub(crate) struct KeywordEmbedder {
        pub calls: AtomicUsize,
    }

    const VOCAB: [&str; 4] = ["rust", "kubernetes", "leadership", "sql"];

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(texts
                .iter()
                .map(|t| {
                    let lower = t.to_lowercase();
                    VOCAB
                        .iter()
                        .map(|w| lower.matches(w).count() as f32)
                        .collect()
                })
                .collect())
        }
    }

    #[test]
    fn test_cosine_similarity_bounds() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_empty_index_returns_nothing_without_embedding() {
        let embedder = KeywordEmbedder::default();
        let index = ResumeIndex::default();

        let passages = index.query(&embedder, "rust", 5).await.unwrap();

        assert!(passages.is_empty());
        assert_eq!(embedder.calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_query_ranks_most_similar_first_and_limits_to_k() {
        let embedder = KeywordEmbedder::default();
        let mut index = ResumeIndex::default();
        index
            .add_documents(
                &embedder,
                vec![
                    "Wrote SQL reports for finance.".to_string(),
                    "Built Rust services on Kubernetes.".to_string(),
                    "Rust compiler contributor, Rust meetup organizer.".to_string(),
                    "   ".to_string(),
                ],
            )
            .await
            .unwrap();
        assert_eq!(index.len(), 3);

        let passages = index.query(&embedder, "rust", 2).await.unwrap();

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0], "Rust compiler contributor, Rust meetup organizer.");
        assert_eq!(passages[1], "Built Rust services on Kubernetes.");
    }
}
