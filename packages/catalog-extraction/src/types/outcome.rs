//! Per-URL outcomes and the run report.

use crate::error::UrlError;
use crate::types::exec_info::{ExecutionInfo, TokenUsage};
use crate::types::record::Record;

/// Result of processing one URL.
#[derive(Debug)]
pub enum UrlOutcome {
    /// Page fetched and extracted.
    Extracted {
        url: String,
        record: Record,
        exec_info: ExecutionInfo,
    },

    /// Fetch or extraction failed.
    Failed { url: String, error: UrlError },
}

impl UrlOutcome {
    pub fn url(&self) -> &str {
        match self {
            Self::Extracted { url, .. } | Self::Failed { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted { .. })
    }
}

/// A URL that produced no record.
#[derive(Debug)]
pub struct UrlFailure<'a> {
    /// Position in the input URL list (0-based)
    pub index: usize,
    pub url: &'a str,
    pub error: &'a UrlError,
}

/// Everything a run produced, in input order.
#[derive(Debug, Default)]
pub struct RunReport {
    outcomes: Vec<UrlOutcome>,
    total: usize,
}

impl RunReport {
    pub(crate) fn with_total(total: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(total),
            total,
        }
    }

    pub(crate) fn push(&mut self, outcome: UrlOutcome) {
        self.outcomes.push(outcome);
    }

    /// Number of URLs the run was asked to process.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of URLs processed (succeeded or failed).
    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn outcomes(&self) -> &[UrlOutcome] {
        &self.outcomes
    }

    /// Successful records in input order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.outcomes.iter().filter_map(|o| match o {
            UrlOutcome::Extracted { record, .. } => Some(record),
            UrlOutcome::Failed { .. } => None,
        })
    }

    /// Failed URLs in input order.
    pub fn failures(&self) -> impl Iterator<Item = UrlFailure<'_>> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(index, o)| match o {
                UrlOutcome::Failed { url, error } => Some(UrlFailure { index, url, error }),
                UrlOutcome::Extracted { .. } => None,
            })
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.processed() - self.success_count()
    }

    /// Token usage summed over all extractions.
    pub fn total_usage(&self) -> TokenUsage {
        let mut total = TokenUsage::default();
        for outcome in &self.outcomes {
            if let UrlOutcome::Extracted { exec_info, .. } = outcome {
                total += exec_info.total_usage();
            }
        }
        total
    }

    /// Consume the report, keeping only the records (the ResultSet).
    pub fn into_records(self) -> Vec<Record> {
        self.outcomes
            .into_iter()
            .filter_map(|o| match o {
                UrlOutcome::Extracted { record, .. } => Some(record),
                UrlOutcome::Failed { .. } => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    #[test]
    fn test_report_separates_records_and_failures() {
        let mut report = RunReport::with_total(3);
        report.push(UrlOutcome::Extracted {
            url: "https://a.com".into(),
            record: Record::from_pairs([("Name", "A")]),
            exec_info: ExecutionInfo::new(),
        });
        report.push(UrlOutcome::Failed {
            url: "https://b.com".into(),
            error: FetchError::Status {
                url: "https://b.com".into(),
                status: 404,
            }
            .into(),
        });
        report.push(UrlOutcome::Extracted {
            url: "https://c.com".into(),
            record: Record::from_pairs([("Name", "C")]),
            exec_info: ExecutionInfo::new(),
        });

        assert_eq!(report.total(), 3);
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 1);

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].index, 1);
        assert_eq!(failures[0].url, "https://b.com");
        assert!(failures[0].error.is_fetch());

        let names: Vec<_> = report
            .into_records()
            .iter()
            .map(|r| r.cell("Name").to_string())
            .collect();
        assert_eq!(names, vec!["A", "C"]);
    }
}
