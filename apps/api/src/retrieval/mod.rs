// Retrieval augmentation: resume → chunks → embedded index → top-k passages
// rendered as a context block for question-generation prompts.
// Embedding calls go through llm_client via the `Embedder` trait.

pub mod index;
pub mod resume;

pub use index::{Embedder, ResumeIndex};

use crate::llm_client::LlmError;

/// Ranked passages for one prompt. Order is the index's similarity order;
/// duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassageBlock {
    passages: Vec<String>,
}

impl PassageBlock {
    pub fn new(passages: Vec<String>) -> Self {
        Self { passages }
    }

    pub fn passages(&self) -> &[String] {
        &self.passages
    }

    /// Renders the prompt section. An empty block still renders the full
    /// section with empty content.
    pub fn render(&self) -> String {
        format!(
            "\n# Inject Domain Information\nHere is the retrieved passage:\n{{\n    \"{}\"\n}}\n",
            self.passages.join("\n")
        )
    }
}

/// Fetches the `top_k` passages most relevant to `query`.
/// No re-ranking or filtering beyond what the index does.
pub async fn retrieve_context(
    index: &ResumeIndex,
    embedder: &dyn Embedder,
    query: &str,
    top_k: usize,
) -> Result<PassageBlock, LlmError> {
    let passages = index.query(embedder, query, top_k).await?;
    Ok(PassageBlock::new(passages))
}
