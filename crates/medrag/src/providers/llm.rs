//! LLM provider trait for generating answers

use async_trait::async_trait;
use crate::error::Result;

/// Trait for prompt completion
///
/// Implementations:
/// - `GroqClient`: Groq OpenAI-compatible chat completions (llama-3.1-8b-instant)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a fully rendered prompt and return the model's text verbatim
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
