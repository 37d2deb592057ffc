//! Terminal rendering: data preview, results table, progress line.

use catalog_extraction::{ProgressObserver, RunReport, Sheet, Table, UrlError};
use console::{pad_str, style, Alignment, Term};

/// Widest a table column is drawn before truncation.
const MAX_CELL_WIDTH: usize = 40;

fn column_widths(headers: &[String], rows: &[Vec<&str>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| console::measure_text_width(cell))
                .chain(std::iter::once(console::measure_text_width(header)))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect()
}

fn render_row(cells: impl Iterator<Item = String>) -> String {
    cells.collect::<Vec<_>>().join(" │ ")
}

/// Draw an aligned table.
fn print_grid(headers: &[String], rows: &[Vec<&str>]) {
    let widths = column_widths(headers, rows);

    let header = render_row(
        headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| {
                style(pad_str(h, *w, Alignment::Left, Some("…")))
                    .bold()
                    .to_string()
            }),
    );
    println!("{}", header);
    let rule = widths
        .iter()
        .map(|w| "─".repeat(*w))
        .collect::<Vec<_>>()
        .join("─┼─");
    println!("{}", style(rule).dim());

    for row in rows {
        println!(
            "{}",
            render_row(widths.iter().enumerate().map(|(i, w)| {
                let cell = row.get(i).copied().unwrap_or("");
                pad_str(cell, *w, Alignment::Left, Some("…")).into_owned()
            }))
        );
    }
}

/// Show the first rows of the input sheet.
pub fn print_preview(sheet: &Sheet, rows: usize) {
    println!(
        "{} {} ({} rows)",
        style("Sheet").cyan().bold(),
        sheet.name,
        sheet.row_count()
    );

    let preview: Vec<Vec<&str>> = sheet
        .preview(rows)
        .iter()
        .map(|row| row.iter().map(|c| c.as_deref().unwrap_or("")).collect())
        .collect();
    print_grid(sheet.columns(), &preview);

    if sheet.row_count() > rows {
        println!("{}", style(format!("… {} more rows", sheet.row_count() - rows)).dim());
    }
    println!();
}

/// Show the extracted results the way they will be exported.
pub fn print_results(table: &Table) {
    let rows: Vec<Vec<&str>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(String::as_str).collect())
        .collect();
    print_grid(&table.headers, &rows);
    println!();
}

/// List the URLs that produced no record.
pub fn print_failures(report: &RunReport) {
    if report.failure_count() == 0 {
        return;
    }
    println!(
        "{}",
        style(format!("{} URL(s) failed:", report.failure_count()))
            .red()
            .bold()
    );
    for failure in report.failures() {
        println!("  {} {} {}", style("✗").red(), failure.url, style(failure.error).dim());
    }
    println!();
}

/// Progress line on stderr: `[####------] 4/10`.
pub struct ProgressLine {
    term: Term,
    width: usize,
}

impl ProgressLine {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
            width: 30,
        }
    }

    fn bar(&self, processed: usize, total: usize) -> String {
        let filled = if total == 0 {
            self.width
        } else {
            processed * self.width / total
        };
        format!(
            "[{}{}] {}/{}",
            "#".repeat(filled),
            "-".repeat(self.width - filled),
            processed,
            total
        )
    }
}

impl Default for ProgressLine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ProgressLine {
    fn on_progress(&mut self, processed: usize, total: usize) {
        let line = format!("Processing {}", self.bar(processed, total));
        // Terminal write failures only lose the progress line.
        let _ = self.term.clear_line();
        let _ = self.term.write_str(&style(line).blue().to_string());
        if processed == total {
            let _ = self.term.write_line("");
        }
    }

    fn on_failure(&mut self, _index: usize, url: &str, error: &UrlError) {
        let _ = self.term.clear_line();
        let _ = self
            .term
            .write_line(&format!("{} {}: {}", style("✗").red(), url, error));
    }
}
