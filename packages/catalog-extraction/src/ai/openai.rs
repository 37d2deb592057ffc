//! OpenAI implementation of the extraction capability.
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_extraction::{ai::OpenAIExtractor, GraphConfig};
//!
//! let extractor = OpenAIExtractor::new(GraphConfig::default_for(api_key));
//! let output = extractor.extract(&request).await?;
//! ```

use std::time::Instant;

use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient, OpenAIError};
use tracing::{debug, info};

use crate::ai::{normalize, prepare};
use crate::error::{ExtractResult, ExtractionError};
use crate::traits::extractor::{ExtractionOutput, ExtractionRequest, Extractor};
use crate::types::{
    config::GraphConfig,
    exec_info::{ExecutionInfo, NodeInfo},
};

/// Instructions wrapped around the operator's prompt.
const SYSTEM_PROMPT: &str = "You are a website scraper. You are given the content of one \
product catalog page and a question about it. Answer with a single flat JSON object whose \
keys are the requested field names and whose values are the text found on the page. \
Use null for fields that are not on the page. Describe only the main product of the page, \
never related or suggested products. Do not invent values.";

/// OpenAI-backed extractor.
///
/// Each call runs three steps, each recorded in [`ExecutionInfo`]:
/// `ParseNode` (HTML to markdown, truncation), `GenerateAnswerNode` (the
/// model call) and `ParseAnswerNode` (JSON to record).
#[derive(Debug, Clone)]
pub struct OpenAIExtractor {
    client: OpenAIClient,
    config: GraphConfig,
}

impl OpenAIExtractor {
    /// Create an extractor for the given configuration.
    pub fn new(config: GraphConfig) -> Self {
        let mut client = OpenAIClient::new(config.api_key.expose());
        if let Some(base_url) = &config.base_url {
            client = client.with_base_url(base_url.clone());
        }
        Self { client, config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    fn prepare_content(&self, source: &str) -> String {
        let text = if prepare::looks_like_html(source) {
            prepare::html_to_markdown(source)
        } else {
            source.to_string()
        };
        let truncated =
            openai_client::truncate_to_char_boundary(&text, self.config.max_content_chars);
        if truncated.len() < text.len() {
            debug!(
                original_len = text.len(),
                kept_len = truncated.len(),
                "Page content truncated"
            );
        }
        truncated.to_string()
    }

    fn user_message(request: &ExtractionRequest, content: &str) -> String {
        let title = prepare::extract_title(&request.source)
            .map(|t| format!("PAGE TITLE: {t}\n\n"))
            .unwrap_or_default();
        format!(
            "QUESTION:\n{}\n\nSOURCE URL: {}\n\n{}PAGE CONTENT:\n{}",
            request.prompt, request.source_url, title, content
        )
    }
}

fn map_error(error: OpenAIError) -> ExtractionError {
    match error {
        e if e.is_auth() => ExtractionError::Authentication(e.to_string()),
        OpenAIError::Config(message) => ExtractionError::Config(message),
        other => ExtractionError::AI(Box::new(other)),
    }
}

#[async_trait]
impl Extractor for OpenAIExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> ExtractResult<ExtractionOutput> {
        if self.config.api_key.is_blank() {
            return Err(ExtractionError::Config("API key is empty".into()));
        }

        let mut exec_info = ExecutionInfo::new();

        let started = Instant::now();
        let content = self.prepare_content(&request.source);
        exec_info.push(NodeInfo::new("ParseNode", started.elapsed()));

        let chat = ChatRequest::new(&self.config.model)
            .message(Message::system(SYSTEM_PROMPT))
            .message(Message::user(Self::user_message(request, &content)))
            .temperature(self.config.temperature)
            .json_object();

        let started = Instant::now();
        let response = self.client.chat_completion(chat).await.map_err(map_error)?;
        let mut node = NodeInfo::new("GenerateAnswerNode", started.elapsed());
        if let Some(usage) = response.usage {
            node = node.with_usage(usage.into());
        }
        exec_info.push(node);

        let started = Instant::now();
        let raw = response.content.ok_or(ExtractionError::EmptyResponse)?;
        let record = normalize::parse_record(&raw)?;
        exec_info.push(NodeInfo::new("ParseAnswerNode", started.elapsed()));

        if self.config.verbose {
            info!(
                url = %request.source_url,
                model = %self.config.model,
                fields = record.len(),
                finish_reason = ?response.finish_reason,
                "Extraction finished"
            );
        }

        Ok(ExtractionOutput { record, exec_info })
    }

    fn name(&self) -> &str {
        "openai"
    }
}
