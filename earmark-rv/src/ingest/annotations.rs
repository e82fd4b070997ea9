//! Error-segment annotation parsing
//!
//! One row per annotated segment, keyed by the transcript's audio file.
//! Sources arrive as CSV or TSV exports of the same sheet, with any subset
//! of the recognized columns present. Columns resolve by header name, rows
//! too short to carry a record are dropped and counted, and unparseable
//! timing cells degrade the row to an untimed record instead of failing.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::{base_file_name, detect_delimiter, strip_bom};

/// One annotated error segment within an audio file.
///
/// Timing fields are absent either because the source column was missing or
/// because a cell in the row failed to parse; the record itself survives
/// with its error text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    pub long_form_start: Option<f64>,
    pub long_form_end: Option<f64>,
    pub long_form_error: String,
    pub short_form_error: String,
    pub short_form_start: Option<f64>,
    pub short_form_end: Option<f64>,
}

/// Parse result: per-file records plus load diagnostics
#[derive(Debug, Default)]
pub struct ParsedAnnotations {
    /// Records keyed by audio base filename; row order within a file is the
    /// input row order
    pub by_file: HashMap<String, Vec<AnnotationRecord>>,
    /// Distinct filenames in first-seen order, for display
    pub file_order: Vec<String>,
    /// Rows dropped as malformed or unattributable
    pub skipped_rows: usize,
}

impl ParsedAnnotations {
    /// Total record count across all files
    pub fn record_count(&self) -> usize {
        self.by_file.values().map(Vec::len).sum()
    }
}

/// Positional indices of the recognized columns, resolved from the header
#[derive(Debug, Default)]
struct ColumnMap {
    transcript_file: Option<usize>,
    long_form_start: Option<usize>,
    long_form_end: Option<usize>,
    long_form_error: Option<usize>,
    short_form_error: Option<usize>,
    short_form_start: Option<usize>,
    short_form_end: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &csv::StringRecord) -> Self {
        let mut map = Self::default();
        for (idx, name) in header.iter().enumerate() {
            match name.trim_start_matches('\u{feff}').trim() {
                "transcriptFile" => map.transcript_file = Some(idx),
                "longFormStart" => map.long_form_start = Some(idx),
                "longFormEnd" => map.long_form_end = Some(idx),
                "longFormError" => map.long_form_error = Some(idx),
                "shortFormError" => map.short_form_error = Some(idx),
                "shortFormStart" => map.short_form_start = Some(idx),
                "shortFormEnd" => map.short_form_end = Some(idx),
                _ => {}
            }
        }
        map
    }

    /// Highest resolved index; rows must reach past it to carry a record
    fn max_index(&self) -> Option<usize> {
        [
            self.transcript_file,
            self.long_form_start,
            self.long_form_end,
            self.long_form_error,
            self.short_form_error,
            self.short_form_start,
            self.short_form_end,
        ]
        .into_iter()
        .flatten()
        .max()
    }
}

/// Parse delimited error-segment text into per-file annotation records.
///
/// The delimiter is detected by counting tabs against commas, so CSV and
/// TSV exports of the same sheet parse identically. Empty input or an
/// unrecognized header yields an empty result, not an error.
pub fn parse_annotations(text: &str) -> ParsedAnnotations {
    let text = strip_bom(text);
    let delimiter = detect_delimiter(text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut parsed = ParsedAnnotations::default();

    let columns = match reader.headers() {
        Ok(header) => ColumnMap::from_header(header),
        Err(_) => return parsed,
    };

    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(_) => {
                parsed.skipped_rows += 1;
                continue;
            }
        };

        if row.iter().all(|cell| cell.trim().is_empty()) {
            parsed.skipped_rows += 1;
            continue;
        }

        // Truncated rows cannot reach every resolved column
        if let Some(max) = columns.max_index() {
            if row.len() <= max {
                parsed.skipped_rows += 1;
                continue;
            }
        }

        let Some(file) = cell(&row, columns.transcript_file).and_then(base_file_name) else {
            parsed.skipped_rows += 1;
            continue;
        };

        let (long_form_start, long_form_end, short_form_start, short_form_end) = parse_timing(
            cell(&row, columns.long_form_start),
            cell(&row, columns.long_form_end),
            cell(&row, columns.short_form_start),
            cell(&row, columns.short_form_end),
        );

        let record = AnnotationRecord {
            long_form_start,
            long_form_end,
            long_form_error: text_cell(&row, columns.long_form_error),
            short_form_error: text_cell(&row, columns.short_form_error),
            short_form_start,
            short_form_end,
        };

        if !parsed.by_file.contains_key(&file) {
            parsed.file_order.push(file.clone());
        }
        parsed.by_file.entry(file).or_default().push(record);
    }

    debug!(
        "Parsed {} annotation records across {} files ({} rows skipped)",
        parsed.record_count(),
        parsed.file_order.len(),
        parsed.skipped_rows
    );

    parsed
}

fn cell<'a>(row: &'a csv::StringRecord, idx: Option<usize>) -> Option<&'a str> {
    idx.and_then(|i| row.get(i))
}

fn text_cell(row: &csv::StringRecord, idx: Option<usize>) -> String {
    cell(row, idx).unwrap_or("").trim().to_string()
}

/// Parse the four timing cells of one row.
///
/// Long-form times are expected; short-form times may be blank or their
/// columns missing entirely. One unparseable cell drops the whole row's
/// timing to absent, so records are either fully timed or untimed.
fn parse_timing(
    long_start: Option<&str>,
    long_end: Option<&str>,
    short_start: Option<&str>,
    short_end: Option<&str>,
) -> (Option<f64>, Option<f64>, Option<f64>, Option<f64>) {
    fn required(cell: Option<&str>) -> Option<f64> {
        cell?.trim().parse::<f64>().ok()
    }

    // A blank short-form cell is absent, not malformed
    fn optional(cell: Option<&str>) -> Option<Option<f64>> {
        match cell.map(str::trim) {
            None | Some("") => Some(None),
            Some(text) => text.parse::<f64>().ok().map(Some),
        }
    }

    let timed = (|| {
        let long_start = required(long_start)?;
        let long_end = required(long_end)?;
        let short_start = optional(short_start)?;
        let short_end = optional(short_end)?;
        Some((Some(long_start), Some(long_end), short_start, short_end))
    })();

    timed.unwrap_or((None, None, None, None))
}
