//! Resume ingestion: uploaded bytes → plain text → overlapping chunks → index.

use bytes::Bytes;
use text_splitter::{ChunkConfig, TextSplitter};
use tracing::info;

use crate::errors::AppError;
use crate::retrieval::index::{Embedder, ResumeIndex};

/// Target chunk size in characters.
pub const CHUNK_CAPACITY: usize = 500;
/// Characters shared between neighbouring chunks.
pub const CHUNK_OVERLAP: usize = 50;

/// Extracts text from an uploaded resume. `.txt`/`.md` files are read as
/// UTF-8 (lossy); everything else is treated as PDF.
pub async fn extract_resume_text(bytes: Bytes, filename: &str) -> Result<String, AppError> {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".txt") || lower.ends_with(".md") {
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }

    // pdf-extract is synchronous and CPU-bound
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
        .map_err(|e| AppError::Validation(format!("Could not read resume PDF: {e}")))
}

/// Splits resume text into ~500-character chunks with 50 characters of overlap.
pub fn chunk_resume(text: &str) -> Vec<String> {
    let config = ChunkConfig::new(CHUNK_CAPACITY)
        .with_overlap(CHUNK_OVERLAP)
        .unwrap_or_else(|_| ChunkConfig::new(CHUNK_CAPACITY));
    let splitter = TextSplitter::new(config);

    splitter.chunks(text).map(str::to_string).collect()
}

/// Builds a fresh index from resume text.
pub async fn index_resume(text: &str, embedder: &dyn Embedder) -> Result<ResumeIndex, AppError> {
    let chunks = chunk_resume(text);
    info!("Resume split into {} chunks", chunks.len());

    let mut index = ResumeIndex::default();
    index
        .add_documents(embedder, chunks)
        .await
        .map_err(|e| AppError::Llm(format!("Resume embedding failed: {e}")))?;
    info!("Resume index holds {} passages", index.len());
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::index::tests::KeywordEmbedder;

    #[test]
    fn test_chunk_resume_respects_capacity() {
        let text = "Designed and operated Rust services handling payments traffic. ".repeat(40);
        let chunks = chunk_resume(&text);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= CHUNK_CAPACITY));
    }

    #[test]
    fn test_chunk_resume_short_text_is_single_chunk() {
        let chunks = chunk_resume("Jane Doe - Senior Engineer");
        assert_eq!(chunks, vec!["Jane Doe - Senior Engineer".to_string()]);
    }

    #[test]
    fn test_chunk_resume_empty_text_has_no_chunks() {
        assert!(chunk_resume("").is_empty());
    }

    #[tokio::test]
    async fn test_plain_text_resume_is_read_directly() {
        let text = extract_resume_text(Bytes::from_static(b"Rust, SQL, Kubernetes"), "cv.TXT")
            .await
            .unwrap();
        assert_eq!(text, "Rust, SQL, Kubernetes");
    }

    #[tokio::test]
    async fn test_invalid_pdf_is_rejected() {
        let result = extract_resume_text(Bytes::from_static(b"not a pdf"), "cv.pdf").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_index_resume_indexes_every_chunk() {
        let embedder = KeywordEmbedder::default();
        let index = index_resume("Rust engineer with SQL experience.", &embedder)
            .await
            .unwrap();
        assert_eq!(index.len(), 1);
    }
}
