//! Page fetcher implementations.
//!
//! - `HttpFetcher` - plain GET over reqwest
//! - `MockFetcher` - canned pages for tests (see [`crate::testing`])

mod http;

pub use http::HttpFetcher;

pub use crate::traits::fetcher::{FetchedPage, PageFetcher};
