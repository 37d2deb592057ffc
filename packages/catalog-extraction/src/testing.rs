//! Testing utilities including mock implementations.
//!
//! These let applications exercise the pipeline without network access or
//! model calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{ExtractResult, ExtractionError, FetchError, FetchResult};
use crate::traits::{
    extractor::{ExtractionOutput, ExtractionRequest, Extractor},
    fetcher::{FetchedPage, PageFetcher},
};
use crate::types::{
    exec_info::{ExecutionInfo, NodeInfo, TokenUsage},
    record::Record,
};

#[derive(Debug, Clone)]
enum MockPage {
    Body(String),
    Status(u16),
    Unreachable,
}

/// A mock page fetcher.
///
/// Unknown URLs answer with HTTP 404.
#[derive(Default, Clone)]
pub struct MockFetcher {
    /// Canned responses by URL
    pages: Arc<RwLock<HashMap<String, MockPage>>>,

    /// Artificial latency by URL
    delays: Arc<RwLock<HashMap<String, Duration>>>,

    /// URLs requested, in call order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.into(), MockPage::Body(body.into()));
        self
    }

    /// Answer `url` with a non-2xx status.
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.into(), MockPage::Status(status));
        self
    }

    /// Fail `url` with a network error.
    pub fn fail_url(self, url: impl Into<String>) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.into(), MockPage::Unreachable);
        self
    }

    /// Delay the response for `url`.
    pub fn with_delay(self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(url.into(), delay);
        self
    }

    /// Get all URLs fetched so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.calls.write().unwrap().push(url.to_string());

        let delay = self.delays.read().unwrap().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let page = self.pages.read().unwrap().get(url).cloned();
        match page {
            Some(MockPage::Body(body)) => Ok(FetchedPage::new(url, body)),
            Some(MockPage::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            Some(MockPage::Unreachable) => Err(FetchError::Http {
                url: url.to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "mock connection refused",
                )),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[derive(Debug, Clone, Copy)]
enum MockFailure {
    Authentication,
    Malformed,
}

/// Record of a call made to the mock extractor.
#[derive(Debug, Clone)]
pub struct MockExtractorCall {
    pub prompt: String,
    pub content: String,
    pub source_url: String,
}

/// A mock extractor.
///
/// Answers with the record registered for the request's source URL, then the
/// default record, then an empty-response error.
#[derive(Default, Clone)]
pub struct MockExtractor {
    /// Predefined records by source URL
    records: Arc<RwLock<HashMap<String, Record>>>,

    /// Fallback record
    default_record: Option<Record>,

    /// Failures by source URL
    failures: Arc<RwLock<HashMap<String, MockFailure>>>,

    /// Token usage reported per call
    usage: TokenUsage,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockExtractorCall>>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests for `url` with these fields.
    pub fn with_record<K, V>(
        self,
        url: impl Into<String>,
        pairs: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.records
            .write()
            .unwrap()
            .insert(url.into(), Record::from_pairs(pairs));
        self
    }

    /// Answer every other request with these fields.
    pub fn with_default_record<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.default_record = Some(Record::from_pairs(pairs));
        self
    }

    /// Report this token usage on every call.
    pub fn with_usage(mut self, prompt_tokens: u32, completion_tokens: u32) -> Self {
        self.usage = TokenUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        };
        self
    }

    /// Fail requests for `url` with a malformed-response error.
    pub fn fail_url(self, url: impl Into<String>) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(url.into(), MockFailure::Malformed);
        self
    }

    /// Fail requests for `url` with an authentication error.
    pub fn fail_auth(self, url: impl Into<String>) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(url.into(), MockFailure::Authentication);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockExtractorCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> ExtractResult<ExtractionOutput> {
        self.calls.write().unwrap().push(MockExtractorCall {
            prompt: request.prompt.clone(),
            content: request.source.clone(),
            source_url: request.source_url.clone(),
        });

        let failure = self.failures.read().unwrap().get(&request.source_url).copied();
        match failure {
            Some(MockFailure::Authentication) => {
                return Err(ExtractionError::Authentication("mock invalid key".into()))
            }
            Some(MockFailure::Malformed) => {
                return Err(ExtractionError::MalformedResponse {
                    reason: "mock malformed reply".into(),
                })
            }
            None => {}
        }

        let record = self
            .records
            .read()
            .unwrap()
            .get(&request.source_url)
            .cloned()
            .or_else(|| self.default_record.clone())
            .ok_or(ExtractionError::EmptyResponse)?;

        let mut exec_info = ExecutionInfo::new();
        exec_info.push(NodeInfo::new("MockNode", Duration::ZERO).with_usage(self.usage));

        Ok(ExtractionOutput { record, exec_info })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
