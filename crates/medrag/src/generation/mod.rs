//! Answer generation over retrieved report chunks

pub mod engine;
pub mod prompt;

pub use engine::AnswerEngine;
pub use prompt::PromptBuilder;
