//! `catalog-extract`: pull product specifications from catalog pages into a
//! spreadsheet.
//!
//! Pick an input spreadsheet, a URL column, a prompt and an API key; every
//! valid URL is fetched and sent to the model, and the records are written to
//! `ProductSpec_<YYYYMMDDHHMM>.xlsx`.

mod config;
mod display;

use anyhow::{bail, Context, Result};
use catalog_extraction::{
    fetchers::HttpFetcher, open_sheet, output_filename, partition_urls, run,
    save_results_to_excel, to_table, ExportOutcome, FailurePolicy, GraphConfig, OpenAIExtractor,
    RunConfig, Sheet, DEFAULT_COLUMN, DEFAULT_PROMPT,
};
use clap::Parser;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Password, Select};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::FileConfig;
use crate::display::ProgressLine;

/// Rows shown in the input preview.
const PREVIEW_ROWS: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "catalog-extract")]
#[command(about = "Extract product specifications from catalog pages", long_about = None)]
struct Cli {
    /// Spreadsheet with product URLs (.xlsx, .xls, .ods or .csv)
    input: PathBuf,

    /// Column holding the URLs (prompted for when omitted)
    #[arg(short, long)]
    column: Option<String>,

    /// Sheet to read (default: first sheet)
    #[arg(short, long)]
    sheet: Option<String>,

    /// Output file (default: ProductSpec_<timestamp>.xlsx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Custom extraction prompt
    #[arg(short, long, conflicts_with = "prompt_file")]
    prompt: Option<String>,

    /// Read the extraction prompt from a file
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model identifier
    #[arg(long)]
    model: Option<String>,

    /// API base URL override
    #[arg(long)]
    base_url: Option<String>,

    /// URLs processed at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Record failed URLs and continue instead of stopping
    #[arg(long)]
    keep_going: bool,

    /// Page fetch timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Configuration file (default: catalog-extract.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Debug logging for the extraction library
    #[arg(short, long)]
    verbose: bool,

    /// Never prompt; fail when a required value is missing
    #[arg(long)]
    no_input: bool,

    /// Print the input columns and exit
    #[arg(long)]
    list_columns: bool,
}

impl Cli {
    fn interactive(&self) -> bool {
        !self.no_input && console::user_attended()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before parsing so OPENAI_API_KEY reaches clap
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "info,catalog_extraction=debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let file_config = FileConfig::load(cli.config.as_deref())?;

    let sheet_name = cli.sheet.clone().or_else(|| file_config.sheet.clone());
    let sheet = open_sheet(&cli.input, sheet_name.as_deref())
        .with_context(|| format!("Failed to open {}", cli.input.display()))?;

    if cli.list_columns {
        for column in sheet.columns() {
            println!("{}", column);
        }
        return Ok(());
    }

    display::print_preview(&sheet, PREVIEW_ROWS);

    let column = choose_column(&cli, &file_config, &sheet)?;
    let partition = partition_urls(sheet.column(&column)?);
    if let Some(warning) = partition.warning() {
        println!("{} {}", style("⚠").yellow(), style(warning).yellow());
    }
    if partition.valid.is_empty() {
        println!("{}", style("No valid URLs to process.").yellow());
        return Ok(());
    }
    println!(
        "{} {} valid URL(s) in column '{}'",
        style("✓").green(),
        partition.valid.len(),
        column
    );

    let api_key = resolve_api_key(&cli)?;
    let prompt = resolve_prompt(&cli, &file_config)?;

    let mut graph_config = GraphConfig::default_for(api_key);
    if let Some(model) = cli.model.clone().or_else(|| file_config.model.clone()) {
        graph_config = graph_config.with_model(model);
    }
    if let Some(base_url) = cli.base_url.clone().or_else(|| file_config.base_url.clone()) {
        graph_config = graph_config.with_base_url(base_url);
    }
    if let Some(max) = file_config.max_content_chars {
        graph_config = graph_config.with_max_content_chars(max);
    }

    let mut run_config = RunConfig::new();
    if let Some(prompt) = prompt {
        run_config = run_config.with_prompt(prompt);
    }
    let policy = if cli.keep_going {
        FailurePolicy::Isolate
    } else {
        file_config.failure_policy.unwrap_or_default()
    };
    run_config = run_config.with_failure_policy(policy);
    if let Some(concurrency) = cli.concurrency.or(file_config.concurrency) {
        run_config = run_config.with_concurrency(concurrency);
    }
    if let Some(secs) = cli.timeout_secs.or(file_config.timeout_secs) {
        run_config = run_config.with_fetch_timeout(Duration::from_secs(secs));
    }

    let fetcher = HttpFetcher::from_config(&run_config).context("Failed to build HTTP client")?;
    let extractor = OpenAIExtractor::new(graph_config);

    let mut progress = ProgressLine::new();
    let report = run(
        &partition.valid,
        &fetcher,
        &extractor,
        &run_config,
        Some(&mut progress),
    )
    .await
    .context("Extraction stopped; no results were saved")?;

    println!();
    display::print_failures(&report);

    let records: Vec<_> = report.records().cloned().collect();
    if let Some(table) = to_table(&records) {
        display::print_results(&table);
    }

    let output = cli.output.clone().unwrap_or_else(|| {
        let name = output_filename(&chrono::Local::now());
        match &file_config.output_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    });
    match save_results_to_excel(&records, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?
    {
        ExportOutcome::Written { path, rows, .. } => println!(
            "{} Saved {} row(s) to {}",
            style("✓").green().bold(),
            rows,
            path.display()
        ),
        ExportOutcome::Skipped => println!("{}", style("No results to save.").yellow()),
    }

    let usage = report.total_usage();
    println!(
        "{}",
        style(format!(
            "Tokens: {} prompt + {} completion = {}",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        ))
        .dim()
    );

    Ok(())
}

/// Flag, then config file, then a picker; `URLs` when nothing else applies.
fn choose_column(cli: &Cli, file_config: &FileConfig, sheet: &Sheet) -> Result<String> {
    if let Some(column) = cli.column.clone().or_else(|| file_config.column.clone()) {
        return Ok(column);
    }

    let columns = sheet.columns();
    if columns.is_empty() {
        bail!("Sheet '{}' has no columns", sheet.name);
    }
    if !cli.interactive() {
        return Ok(DEFAULT_COLUMN.to_string());
    }

    let default = columns
        .iter()
        .position(|c| c == DEFAULT_COLUMN)
        .unwrap_or(0);
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Column with product URLs")
        .items(columns)
        .default(default)
        .interact()?;

    Ok(columns[selection].clone())
}

/// Flag or environment, then a hidden prompt.
fn resolve_api_key(cli: &Cli) -> Result<String> {
    if let Some(key) = cli.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        return Ok(key.to_string());
    }
    if !cli.interactive() {
        bail!("No API key: pass --api-key or set OPENAI_API_KEY");
    }

    let key = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("OpenAI API key")
        .interact()?;
    Ok(key)
}

/// `--prompt-file`, `--prompt`, config file, then an optional prompt.
/// `None` selects the built-in prompt.
fn resolve_prompt(cli: &Cli, file_config: &FileConfig) -> Result<Option<String>> {
    if let Some(path) = &cli.prompt_file {
        return read_prompt_file(path).map(Some);
    }
    if let Some(prompt) = cli.prompt.clone().or_else(|| file_config.prompt.clone()) {
        return Ok(Some(prompt));
    }
    if !cli.interactive() {
        return Ok(None);
    }

    let prompt: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Extraction prompt")
        .with_initial_text(DEFAULT_PROMPT)
        .allow_empty(true)
        .interact_text()?;
    Ok(custom_prompt(prompt))
}

/// `None` when the operator kept the default or cleared the field.
fn custom_prompt(prompt: String) -> Option<String> {
    (!prompt.is_empty() && prompt != DEFAULT_PROMPT).then_some(prompt)
}

fn read_prompt_file(path: &Path) -> Result<String> {
    let prompt = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read prompt file {}", path.display()))?;
    Ok(prompt.trim_end().to_string())
}
