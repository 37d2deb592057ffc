//! Typed errors for the catalog extraction pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell a
//! failed page fetch from a failed model call from a failed spreadsheet write.

use std::path::PathBuf;

use thiserror::Error;

/// Reading the operator's input spreadsheet failed.
#[derive(Debug, Error)]
pub enum InputError {
    /// File could not be opened or parsed
    #[error("cannot read {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// File extension is not a known spreadsheet format
    #[error("unsupported input format: {} (expected .xlsx, .xls, .ods or .csv)", .path.display())]
    UnsupportedFormat { path: PathBuf },

    /// Requested sheet is missing
    #[error("sheet '{sheet}' not found (available: {})", .available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    /// Workbook has no sheets, or the sheet has no header row
    #[error("sheet '{sheet}' is empty")]
    EmptySheet { sheet: String },

    /// Requested column is missing from the header row
    #[error("column '{column}' not found (available: {})", .available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },
}

/// Retrieving a product page failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level failure (DNS, connect, TLS, timeout)
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Server answered with a non-2xx status
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    /// Response body could not be read
    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// HTTP client could not be constructed
    #[error("HTTP client setup failed: {0}")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl FetchError {
    /// HTTP status for [`FetchError::Status`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The extraction capability failed to produce a record.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The model service rejected the API key
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// AI service unavailable or failed
    #[error("AI service error: {0}")]
    AI(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The model returned no content, or an empty object
    #[error("model returned an empty response")]
    EmptyResponse,

    /// The model reply is not valid JSON
    #[error("malformed model response: {reason}")]
    MalformedResponse { reason: String },

    /// The model reply is valid JSON but not an object
    #[error("model response is a JSON {found}, expected an object")]
    NotAnObject { found: &'static str },

    /// Capability misconfigured (e.g. missing API key)
    #[error("config error: {0}")]
    Config(String),
}

/// One URL failed; either stage can be the cause.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl UrlError {
    /// True when the page could not be retrieved.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}

/// A run stopped before all URLs were processed.
#[derive(Debug, Error)]
pub enum RunError {
    /// A URL failed under [`FailurePolicy::Abort`](crate::FailurePolicy::Abort)
    #[error("run aborted at URL {} of {total} ({url}): {source}", .index + 1)]
    Aborted {
        url: String,
        index: usize,
        total: usize,
        #[source]
        source: UrlError,
    },
}

impl RunError {
    /// The error that stopped the run.
    pub fn cause(&self) -> &UrlError {
        match self {
            Self::Aborted { source, .. } => source,
        }
    }
}

/// Writing the output spreadsheet failed.
#[derive(Debug, Error)]
pub enum ExportError {
    /// xlsx serialization or file write failed
    #[error("spreadsheet write failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Result does not fit the worksheet grid
    #[error("too many {what} for a worksheet: {count}")]
    TooLarge { what: &'static str, count: usize },
}

/// Any failure of an end-to-end pipeline invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input error: {0}")]
    Input(#[from] InputError),

    #[error(transparent)]
    Run(#[from] RunError),

    /// HTTP client could not be built
    #[error("fetcher setup failed: {0}")]
    Fetcher(#[from] FetchError),

    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

/// Result type alias for input operations.
pub type InputResult<T> = std::result::Result<T, InputError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for extraction operations.
pub type ExtractResult<T> = std::result::Result<T, ExtractionError>;

/// Result type alias for export operations.
pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
