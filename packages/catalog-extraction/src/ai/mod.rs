//! AI-backed extraction capability.
//!
//! - [`OpenAIExtractor`] - chat completions in JSON mode
//! - [`prepare`] - HTML to markdown before the model sees it
//! - [`normalize`] - model reply to flat record

pub mod normalize;
mod openai;
pub mod prepare;

pub use openai::OpenAIExtractor;
