//! Label-candidate parsing
//!
//! Candidate rows name a record id, its audio file, an example phrase, and
//! a rough time of occurrence. They share the delimited pipeline of the
//! error-segment parser; only the recognized columns differ.

use tracing::debug;

use earmark_common::human_time::parse_human_time;

use super::{detect_delimiter, strip_bom};

/// One to-be-labeled candidate row
#[derive(Debug, Clone, PartialEq)]
pub struct LabelCandidate {
    pub record_id: String,
    pub record_file: String,
    pub example_phrase: String,
    /// Seconds from file start; `0.0` when the source left it blank
    pub record_time: f64,
}

/// Parse result: candidates in input order plus load diagnostics
#[derive(Debug, Default)]
pub struct ParsedCandidates {
    pub candidates: Vec<LabelCandidate>,
    /// Rows dropped as empty or truncated
    pub skipped_rows: usize,
}

/// Positional indices of the recognized columns
#[derive(Debug, Default)]
struct ColumnMap {
    record_id: Option<usize>,
    record_file: Option<usize>,
    example_phrase: Option<usize>,
    record_time: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &csv::StringRecord) -> Self {
        let mut map = Self::default();
        for (idx, name) in header.iter().enumerate() {
            match name.trim_start_matches('\u{feff}').trim() {
                "record_id" => map.record_id = Some(idx),
                "record_file" => map.record_file = Some(idx),
                "example_phrase" => map.example_phrase = Some(idx),
                "record_time" => map.record_time = Some(idx),
                _ => {}
            }
        }
        map
    }

    fn max_index(&self) -> Option<usize> {
        [
            self.record_id,
            self.record_file,
            self.example_phrase,
            self.record_time,
        ]
        .into_iter()
        .flatten()
        .max()
    }
}

/// Parse delimited candidate text.
///
/// Missing columns leave the corresponding fields empty or zero; the time
/// cell goes through the fail-soft `parse_human_time`, so "1:23.5" and
/// "83.5" read the same and garbage reads as `0.0`.
pub fn parse_candidates(text: &str) -> ParsedCandidates {
    let text = strip_bom(text);
    let delimiter = detect_delimiter(text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut parsed = ParsedCandidates::default();

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

        if let Some(max) = columns.max_index() {
            if row.len() <= max {
                parsed.skipped_rows += 1;
                continue;
            }
        }

        parsed.candidates.push(LabelCandidate {
            record_id: text_cell(&row, columns.record_id),
            record_file: text_cell(&row, columns.record_file),
            example_phrase: text_cell(&row, columns.example_phrase),
            record_time: parse_human_time(&text_cell(&row, columns.record_time)),
        });
    }

    debug!(
        "Parsed {} label candidates ({} rows skipped)",
        parsed.candidates.len(),
        parsed.skipped_rows
    );

    parsed
}

fn text_cell(row: &csv::StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|i| row.get(i)).unwrap_or("").trim().to_string()
}
