//! Product Catalog Spec Extraction Library
//!
//! Pulls structured product specifications out of catalog pages with a
//! language model and writes them to a spreadsheet.
//!
//! # Design Philosophy
//!
//! - Prompt-driven, not schema-driven: the model decides the field names
//! - One flat record per page, stamped with its `Product URL`
//! - The first record fixes the output columns
//! - Library takes credentials explicitly; only front ends read the environment
//!
//! # Usage
//!
//! ```rust,ignore
//! use catalog_extraction::{Pipeline, RunConfig, FailurePolicy};
//! use catalog_extraction::testing::{MockExtractor, MockFetcher};
//!
//! let pipeline = Pipeline::new(MockFetcher::new(), MockExtractor::new())
//!     .with_column("URLs")
//!     .with_run_config(RunConfig::new().with_failure_policy(FailurePolicy::Isolate));
//!
//! let summary = pipeline
//!     .execute(Path::new("urls.xlsx"), Path::new("ProductSpec.xlsx"), None)
//!     .await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams for page fetching and extraction
//! - [`types`] - Records, configuration, execution info, run reports
//! - [`pipeline`] - Input resolution, the runner, export
//! - [`workbook`] - Spreadsheet input
//! - [`fetchers`] - HTTP page fetcher
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;
pub mod workbook;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{
    ExportError, ExtractionError, FetchError, InputError, PipelineError, RunError, UrlError,
};
pub use security::SecretString;
pub use traits::{
    extractor::{ExtractionOutput, ExtractionRequest, Extractor},
    fetcher::{FetchedPage, PageFetcher},
};
pub use types::{
    config::{FailurePolicy, GraphConfig, RunConfig, DEFAULT_MODEL, DEFAULT_PROMPT},
    exec_info::{ExecutionInfo, NodeInfo, TokenUsage},
    outcome::{RunReport, UrlFailure, UrlOutcome},
    record::{Record, PRODUCT_URL_KEY},
};

// Re-export pipeline components
pub use pipeline::{
    export::{output_filename, save_results_to_excel, to_table, ExportOutcome, Table},
    input::{is_valid_url, partition_urls, partition_values, UrlPartition, ValidationWarning},
    progress::{NullProgress, ProgressObserver, RecordingProgress},
    runner::{process_url, run},
    Pipeline, PipelineSummary, DEFAULT_COLUMN, DEFAULT_SHEET,
};

#[cfg(feature = "openai")]
pub use pipeline::{main, runner::run_scraper};

pub use workbook::{open_sheet, read_urls_from_excel, sheet_names, Sheet};

pub use fetchers::HttpFetcher;

#[cfg(feature = "openai")]
pub use ai::OpenAIExtractor;

// Re-export testing utilities
pub use testing::{MockExtractor, MockFetcher};
