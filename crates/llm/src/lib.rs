//! Best-effort item extraction through a hosted language model.

pub mod client;
pub mod prompt;
pub mod response;

pub use client::{
    GeminiClient, LanguageModel, StructuringError, Structurer, DEFAULT_GEMINI_MODEL,
};
pub use prompt::build_prompt;
pub use response::parse_response;
