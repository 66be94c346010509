//! High-level import API: raw logbook input to flight records.
//!
//! ```text
//! bytes ──▶ parser ──▶ RowGroup* ──▶ layout ──▶ batches of row tasks ──▶ ImportOutcome
//!                       (summary pages skipped)   (join-all per batch)
//! ```
//!
//! Rows of a batch run concurrently on the tokio runtime; the batch is awaited
//! as a whole before the next one starts. A row task that panics is logged and
//! counted as skipped, the rest of the batch is kept.
//!
//! # Example
//!
//! ```rust,ignore
//! use logmap::pipeline::{import_file, ImportOptions};
//!
//! let outcome = import_file(path, &resolver, session.distances(), ImportOptions::default()).await?;
//! println!("{} flights", outcome.flights.len());
//! ```

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use crate::api::logs::{log_info, log_info_indent, log_success, log_success_indent, log_warning};
use crate::assemble::{ColumnLayout, ColumnPair, RecordAssembler};
use crate::classify::{is_header_keyword, is_summary_page};
use crate::error::{ImportError, ImportResult, IngestError};
use crate::models::{FlightRecord, Row};
use crate::parser::{parse_bytes, ParseResult, RowGroup, SourceFormat};
use crate::resolve::{AirportResolver, DistanceCache};

/// Rows shown back to the caller when column mapping is needed.
const PREVIEW_ROWS: usize = 5;

// =============================================================================
// Options & outcome
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    /// User-assigned departure column
    #[serde(default)]
    pub from_column: Option<usize>,

    /// User-assigned arrival column
    #[serde(default)]
    pub to_column: Option<usize>,

    /// Rows per concurrent batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    20
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            from_column: None,
            to_column: None,
            batch_size: default_batch_size(),
        }
    }
}

impl ImportOptions {
    pub fn assigned_columns(&self) -> Option<ColumnPair> {
        ColumnPair::from_options(self.from_column, self.to_column)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum ImportStatus {
    Imported,
    /// No flight came out; the caller should assign FROM/TO columns.
    NeedsColumnMapping { preview: Vec<Row> },
}

/// Where the rows came from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    pub format: SourceFormat,
    pub encoding: String,
    pub delimiter: Option<char>,
    pub row_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub flights: Vec<FlightRecord>,
    pub status: ImportStatus,
    pub source: SourceInfo,
    /// Rows handed to the assembler
    pub rows_processed: usize,
    /// Rows that produced no flight, summary pages included
    pub rows_skipped: usize,
    /// Unresolved codes, sorted
    pub missing_airports: Vec<String>,
}

#[derive(Default)]
struct Accumulator {
    flights: Vec<FlightRecord>,
    missing: BTreeSet<String>,
    processed: usize,
    skipped: usize,
}

// =============================================================================
// Entry points
// =============================================================================

/// Import a logbook file, format from its extension.
pub async fn import_file(
    path: &Path,
    resolver: &AirportResolver,
    distances: Arc<DistanceCache>,
    options: ImportOptions,
) -> ImportResult<ImportOutcome> {
    let format = SourceFormat::from_path(path)?;
    log_info(format!("📖 Reading {}...", path.display()));
    let bytes = tokio::fs::read(path)
        .await
        .map_err(IngestError::from)?;
    import_bytes(&bytes, format, resolver, distances, options).await
}

/// Import raw bytes of a known format.
pub async fn import_bytes(
    bytes: &[u8],
    format: SourceFormat,
    resolver: &AirportResolver,
    distances: Arc<DistanceCache>,
    options: ImportOptions,
) -> ImportResult<ImportOutcome> {
    if options.batch_size == 0 {
        return Err(ImportError::InvalidBatchSize);
    }
    let parsed = parse_bytes(bytes, format)?;
    import_parsed(parsed, resolver, distances, options).await
}

/// Import already-parsed rows.
pub async fn import_parsed(
    parsed: ParseResult,
    resolver: &AirportResolver,
    distances: Arc<DistanceCache>,
    options: ImportOptions,
) -> ImportResult<ImportOutcome> {
    if options.batch_size == 0 {
        return Err(ImportError::InvalidBatchSize);
    }

    log_info("Detecting format, encoding and separator...");
    log_success(format!("Format: {}", parsed.format.as_str()));
    log_success(format!("Detected encoding: {}", parsed.encoding));
    if let Some(d) = parsed.delimiter {
        log_success(format!("Detected separator: '{}'", format_delimiter(d)));
    }
    log_success(format!(
        "Read {} rows in {} group(s)",
        parsed.row_count(),
        parsed.groups.len()
    ));

    let source = SourceInfo {
        format: parsed.format,
        encoding: parsed.encoding.clone(),
        delimiter: parsed.delimiter,
        row_count: parsed.row_count(),
    };

    let assigned = options.assigned_columns();
    if let Some(pair) = assigned {
        log_info(format!("Using assigned columns: FROM={} TO={}", pair.from, pair.to));
    }

    log_info("🛫 Extracting flights...");
    let mut acc = Accumulator::default();
    for group in &parsed.groups {
        import_group(group, parsed.format, resolver, &distances, assigned, options.batch_size, &mut acc)
            .await;
    }

    let missing_airports: Vec<String> = acc
        .missing
        .into_iter()
        .filter(|code| !is_header_keyword(code))
        .collect();

    log_success(format!(
        "{} flights from {} rows ({} skipped)",
        acc.flights.len(),
        acc.processed,
        acc.skipped
    ));
    if !missing_airports.is_empty() {
        log_warning(format!("Missing airports: {}", missing_airports.join(", ")));
    }

    let status = if acc.flights.is_empty() {
        log_warning("No flights found: assign FROM/TO columns and import again");
        ImportStatus::NeedsColumnMapping {
            preview: parsed.preview(PREVIEW_ROWS),
        }
    } else {
        ImportStatus::Imported
    };

    Ok(ImportOutcome {
        flights: acc.flights,
        status,
        source,
        rows_processed: acc.processed,
        rows_skipped: acc.skipped,
        missing_airports,
    })
}

// =============================================================================
// Groups & batches
// =============================================================================

async fn import_group(
    group: &RowGroup,
    format: SourceFormat,
    resolver: &AirportResolver,
    distances: &Arc<DistanceCache>,
    assigned: Option<ColumnPair>,
    batch_size: usize,
    acc: &mut Accumulator,
) {
    let label = match group.page {
        Some(page) => format!("Page {}", page),
        None => "Rows".to_string(),
    };

    if group.page.is_some() && is_summary_page(&group.rows) {
        log_warning(format!("{}: totals page, skipped", label));
        acc.skipped += group.rows.len();
        return;
    }

    let directory = resolver.directory();
    let (layout, header_rows) = match format {
        SourceFormat::Delimited => ColumnLayout::for_delimited(&group.rows, directory),
        SourceFormat::Text | SourceFormat::PdfPages => ColumnLayout::detect(&group.rows, directory),
    };
    log_layout(&label, &layout, header_rows.len());

    let assembler = Arc::new(RecordAssembler::new(
        resolver.clone(),
        layout,
        assigned,
        Arc::clone(distances),
    ));

    let rows: Vec<Row> = group
        .rows
        .iter()
        .enumerate()
        .filter(|(i, _)| !header_rows.contains(i))
        .map(|(_, row)| row.clone())
        .collect();

    let before = acc.flights.len();
    for (n, batch) in rows.chunks(batch_size).enumerate() {
        run_batch(&assembler, batch, n + 1, acc).await;
    }
    log_success_indent(format!("{}: {} flights", label, acc.flights.len() - before), 1);
}

async fn run_batch(assembler: &Arc<RecordAssembler>, batch: &[Row], number: usize, acc: &mut Accumulator) {
    let tasks = batch.iter().cloned().map(|row| {
        let assembler = Arc::clone(assembler);
        tokio::spawn(async move { assembler.process_row(&row) })
    });

    for result in join_all(tasks).await {
        acc.processed += 1;
        match result {
            Ok(outcome) => {
                acc.missing.extend(outcome.missing);
                if outcome.flights.is_empty() {
                    acc.skipped += 1;
                } else {
                    acc.flights.extend(outcome.flights);
                }
            }
            Err(e) => {
                log_warning(format!("Batch {}: row task failed ({}), skipped", number, e));
                acc.skipped += 1;
            }
        }
    }
}

fn log_layout(label: &str, layout: &ColumnLayout, header_rows: usize) {
    match layout.route() {
        Some(pair) if layout.is_combined() => {
            log_info_indent(format!("{}: route column {}", label, pair.from), 1)
        }
        Some(pair) => log_info_indent(
            format!("{}: FROM column {}, TO column {}", label, pair.from, pair.to),
            1,
        ),
        None => log_info_indent(format!("{}: no route columns, scanning cells", label), 1),
    }
    if header_rows > 0 {
        log_info_indent(format!("{} header row(s) skipped", header_rows), 2);
    }
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}
