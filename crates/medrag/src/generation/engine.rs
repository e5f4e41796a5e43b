//! Retrieval-augmented answering

use std::sync::Arc;

use crate::error::Result;
use crate::providers::LlmProvider;
use crate::retrieval::VectorIndex;

use super::prompt::PromptBuilder;

/// Answers questions from whatever is currently indexed
pub struct AnswerEngine {
    index: Arc<VectorIndex>,
    llm: Arc<dyn LlmProvider>,
    top_k: usize,
}

impl AnswerEngine {
    pub fn new(index: Arc<VectorIndex>, llm: Arc<dyn LlmProvider>, top_k: usize) -> Self {
        Self { index, llm, top_k }
    }

    /// Retrieve the top chunks, stuff them into one prompt and return the model text verbatim
    pub async fn answer(&self, query: &str) -> Result<String> {
        let results = self.index.retrieve(query, self.top_k).await.map_err(|e| {
            tracing::error!("Retrieval failed: {}", e);
            e
        })?;

        for (rank, result) in results.iter().enumerate() {
            tracing::info!(
                rank = rank + 1,
                filename = %result.chunk.source.filename,
                page = ?result.chunk.source.page_number,
                chunk_index = result.chunk.chunk_index,
                similarity = result.similarity,
                "Retrieved chunk"
            );
        }

        let prompt = PromptBuilder::build_qa_prompt(query, &results);

        let response = self.llm.generate(&prompt).await.map_err(|e| {
            tracing::error!("Generation with {} failed: {}", self.llm.model(), e);
            e
        })?;

        tracing::info!("Generated {} character answer with {}", response.len(), self.llm.name());
        Ok(response)
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }
}
