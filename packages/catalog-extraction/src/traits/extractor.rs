//! The extraction capability.
//!
//! Given page content and a natural-language prompt, an [`Extractor`] returns
//! a flat field→value mapping. Which fields come back is up to the model.

use async_trait::async_trait;

use crate::error::ExtractResult;
use crate::types::{exec_info::ExecutionInfo, record::Record};

/// One extraction task. Credentials live in the extractor's configuration.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Natural-language instruction describing the wanted fields
    pub prompt: String,

    /// Fetched page body
    pub source: String,

    /// Page the content came from
    pub source_url: String,
}

impl ExtractionRequest {
    pub fn new(
        prompt: impl Into<String>,
        source: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            source: source.into(),
            source_url: source_url.into(),
        }
    }
}

/// What an extraction returns.
#[derive(Debug, Clone, Default)]
pub struct ExtractionOutput {
    /// Extracted fields, not yet stamped with the source URL
    pub record: Record,

    /// Diagnostics for logging
    pub exec_info: ExecutionInfo,
}

impl ExtractionOutput {
    pub fn new(record: Record) -> Self {
        Self {
            record,
            exec_info: ExecutionInfo::new(),
        }
    }
}

/// LLM-backed extraction capability.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, request: &ExtractionRequest) -> ExtractResult<ExtractionOutput>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "extractor"
    }
}
