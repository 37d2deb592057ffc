//! The three-stage pipeline: resolve URLs, run extraction, export.
//!
//! [`Pipeline`] composes the stages for a fetcher/extractor pair; [`main`]
//! wires in the HTTP fetcher and OpenAI extractor with default settings.

pub mod export;
pub mod input;
pub mod progress;
pub mod runner;

use std::path::Path;

use tracing::info;

use crate::error::{InputResult, Result, RunError};
use crate::traits::{extractor::Extractor, fetcher::PageFetcher};
use crate::types::{config::RunConfig, outcome::RunReport};
use crate::workbook;

use self::export::{save_results_to_excel, ExportOutcome};
use self::input::UrlPartition;
use self::progress::ProgressObserver;

/// Column read when none is chosen.
pub const DEFAULT_COLUMN: &str = "URLs";

/// Sheet preferred by [`main`] when the workbook has it.
pub const DEFAULT_SHEET: &str = "Sheet1";

/// What an end-to-end run produced.
#[derive(Debug)]
pub struct PipelineSummary {
    /// Valid and rejected cells of the input column
    pub partition: UrlPartition,

    /// Per-URL outcomes
    pub report: RunReport,

    /// Whether a workbook was written
    pub export: ExportOutcome,
}

/// Resolve → run → export for one fetcher/extractor pair.
///
/// # Example
///
/// ```rust,ignore
/// let summary = Pipeline::new(HttpFetcher::new(), extractor)
///     .with_column("Links")
///     .execute(Path::new("urls.xlsx"), Path::new("out.xlsx"), None)
///     .await?;
/// ```
pub struct Pipeline<F, E> {
    fetcher: F,
    extractor: E,
    sheet: Option<String>,
    column: String,
    run_config: RunConfig,
}

impl<F, E> Pipeline<F, E>
where
    F: PageFetcher,
    E: Extractor,
{
    pub fn new(fetcher: F, extractor: E) -> Self {
        Self {
            fetcher,
            extractor,
            sheet: None,
            column: DEFAULT_COLUMN.to_string(),
            run_config: RunConfig::default(),
        }
    }

    /// Read this sheet instead of the first one.
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// Read URLs from this column. Default: `URLs`.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    pub fn with_run_config(mut self, config: RunConfig) -> Self {
        self.run_config = config;
        self
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run_config
    }

    /// Read the URL column of `input` and partition it.
    pub fn resolve(&self, input: &Path) -> InputResult<UrlPartition> {
        workbook::read_urls_from_excel(input, self.sheet.as_deref(), &self.column)
    }

    /// Run extraction over already-resolved URLs.
    pub async fn run(
        &self,
        urls: &[String],
        progress: Option<&mut dyn ProgressObserver>,
    ) -> std::result::Result<RunReport, RunError> {
        runner::run(urls, &self.fetcher, &self.extractor, &self.run_config, progress).await
    }

    /// Resolve, run and export.
    ///
    /// Under the aborting policy a failed URL returns the error and nothing is
    /// written. Under the isolating policy the successful records are written
    /// and the failures are in the summary's report.
    pub async fn execute(
        &self,
        input: &Path,
        output: &Path,
        progress: Option<&mut dyn ProgressObserver>,
    ) -> Result<PipelineSummary> {
        let partition = self.resolve(input)?;
        info!(
            valid = partition.valid.len(),
            invalid = partition.invalid.len(),
            column = %self.column,
            "URLs resolved"
        );

        let report = self.run(&partition.valid, progress).await?;

        let records: Vec<_> = report.records().cloned().collect();
        let export = save_results_to_excel(&records, output)?;

        Ok(PipelineSummary {
            partition,
            report,
            export,
        })
    }
}

/// Pick `Sheet1` when present, else the first sheet.
fn default_sheet(input: &Path) -> InputResult<Option<String>> {
    let names = workbook::sheet_names(input)?;
    Ok(names.into_iter().find(|name| name == DEFAULT_SHEET))
}

/// Programmatic entry point.
///
/// Reads column `URLs` of sheet `Sheet1` (or the first sheet), extracts every
/// valid URL with the default model and writes the results to `output_path`.
/// An empty or missing `prompt` uses the default instruction. The key is
/// taken as given; the environment is never consulted.
#[cfg(feature = "openai")]
pub async fn main(
    input_path: &Path,
    output_path: &Path,
    api_key: &str,
    prompt: Option<&str>,
) -> Result<PipelineSummary> {
    use crate::ai::OpenAIExtractor;
    use crate::fetchers::HttpFetcher;
    use crate::types::config::GraphConfig;

    let mut run_config = RunConfig::new();
    if let Some(prompt) = prompt {
        run_config = run_config.with_prompt(prompt);
    }

    let fetcher = HttpFetcher::from_config(&run_config)?;
    let extractor = OpenAIExtractor::new(GraphConfig::default_for(api_key));

    let mut pipeline = Pipeline::new(fetcher, extractor).with_run_config(run_config);
    if let Some(sheet) = default_sheet(input_path)? {
        pipeline = pipeline.with_sheet(sheet);
    }

    pipeline.execute(input_path, output_path, None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    /// Helper to write a workbook with a `URLs` column on each named sheet.
    fn write_workbook(path: &Path, sheets: Vec<(&str, Vec<&str>)>) {
        let mut workbook = Workbook::new();
        for (name, cells) in sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name).unwrap();
            worksheet.write_string(0, 0, DEFAULT_COLUMN).unwrap();
            for (row, cell) in cells.iter().enumerate() {
                worksheet.write_string(row as u32 + 1, 0, *cell).unwrap();
            }
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_default_sheet_prefers_sheet1() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.xlsx");
        write_workbook(&path, vec![("Notes", vec!["x"]), ("Sheet1", vec!["y"])]);

        assert_eq!(default_sheet(&path).unwrap().as_deref(), Some("Sheet1"));
    }

    #[test]
    fn test_default_sheet_falls_back_to_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.xlsx");
        write_workbook(
            &path,
            vec![
                ("Products", vec!["https://a.com/1"]),
                ("Other", vec!["https://b.com/1"]),
            ],
        );

        assert_eq!(default_sheet(&path).unwrap(), None);
        let partition = Pipeline::new(
            crate::testing::MockFetcher::new(),
            crate::testing::MockExtractor::new(),
        )
        .resolve(&path)
        .unwrap();
        assert_eq!(partition.valid, vec!["https://a.com/1"]);
    }

    #[cfg(feature = "openai")]
    #[tokio::test]
    async fn test_main_without_valid_urls_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.xlsx");
        let output = dir.path().join("out.xlsx");
        write_workbook(
            &input,
            vec![
                ("Other", vec!["https://ignored.com/1"]),
                ("Sheet1", vec!["not a url", "ftp://x"]),
            ],
        );

        let summary = main(&input, &output, "sk-test", None).await.unwrap();

        assert!(summary.partition.valid.is_empty());
        assert_eq!(summary.partition.invalid, vec!["not a url", "ftp://x"]);
        assert_eq!(summary.report.total(), 0);
        assert_eq!(summary.export, ExportOutcome::Skipped);
        assert!(!output.exists());
    }
}
