//! Input resolution: raw column cells to valid / invalid URLs.

use std::fmt;

use tracing::warn;

/// True when `value` starts with an `http://` or `https://` scheme.
///
/// The scheme match is case-sensitive and nothing else is checked.
pub fn is_valid_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Column cells split into usable and rejected URLs, both in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlPartition {
    pub valid: Vec<String>,
    pub invalid: Vec<String>,
}

impl UrlPartition {
    /// The operator-facing warning, if anything was rejected.
    pub fn warning(&self) -> Option<ValidationWarning<'_>> {
        (!self.invalid.is_empty()).then_some(ValidationWarning {
            invalid: &self.invalid,
        })
    }
}

/// Non-fatal notice that some cells are not URLs and will be skipped.
#[derive(Debug, Clone, Copy)]
pub struct ValidationWarning<'a> {
    pub invalid: &'a [String],
}

impl fmt::Display for ValidationWarning<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The following URLs are invalid and will be skipped: {:?}",
            self.invalid
        )
    }
}

/// Partition raw cells. Missing and empty cells are dropped, not rejected.
///
/// Values are not trimmed or deduplicated.
pub fn partition_urls<I, S>(cells: I) -> UrlPartition
where
    I: IntoIterator<Item = Option<S>>,
    S: Into<String>,
{
    let mut partition = UrlPartition::default();
    for cell in cells.into_iter().flatten() {
        let value: String = cell.into();
        if value.is_empty() {
            continue;
        }
        if is_valid_url(&value) {
            partition.valid.push(value);
        } else {
            partition.invalid.push(value);
        }
    }

    if let Some(warning) = partition.warning() {
        warn!(invalid_count = partition.invalid.len(), "{}", warning);
    }

    partition
}

/// [`partition_urls`] for cells that are all present.
pub fn partition_values<I, S>(values: I) -> UrlPartition
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    partition_urls(values.into_iter().map(Some))
}
