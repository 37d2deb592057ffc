//! Page retrieval.

use async_trait::async_trait;

use crate::error::FetchResult;

/// A retrieved product page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL as requested
    pub url: String,

    /// URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// `Content-Type` header, when sent
    pub content_type: Option<String>,

    /// Response body
    pub body: String,
}

impl FetchedPage {
    /// A 200 page with no redirect.
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            final_url: url.clone(),
            url,
            status: 200,
            content_type: None,
            body: body.into(),
        }
    }
}

/// Fetches the body of a page.
///
/// Implementations must fail with [`FetchError`](crate::FetchError) on a
/// non-2xx status rather than return the error page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "fetcher"
    }
}
