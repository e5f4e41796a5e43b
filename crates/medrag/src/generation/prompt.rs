//! Prompt templates for question answering

use crate::retrieval::SearchResult;

/// Prompt builder for report questions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join retrieved chunk texts, separated by blank lines
    pub fn build_context(results: &[SearchResult]) -> String {
        results
            .iter()
            .map(|r| r.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the "stuff" QA prompt: every retrieved chunk goes into one prompt
    pub fn build_qa_prompt(question: &str, results: &[SearchResult]) -> String {
        format!(
            r#"Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.

{context}

Question: {question}
Helpful Answer:"#,
            context = Self::build_context(results),
            question = question,
        )
    }
}
