//! Annotation source ingestion
//!
//! Three input shapes share one pipeline: delimited error-segment rows,
//! delimited label-candidate rows, and WER-log text blocks. The field
//! delimiter and the shape are auto-detected unless the caller declares
//! them; malformed rows are dropped and counted, never fatal.

pub mod annotations;
pub mod candidates;
pub mod werlog;

pub use annotations::{parse_annotations, AnnotationRecord, ParsedAnnotations};
pub use candidates::{parse_candidates, LabelCandidate, ParsedCandidates};
pub use werlog::{parse_wer_log, TranscriptionInfo};

use serde::Deserialize;

/// Annotation source shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Error-segment rows keyed by transcript file
    Errors,
    /// To-be-labeled candidate rows keyed by record id
    Candidates,
    /// Per-file WER scoring blocks
    Werlog,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Errors => "errors",
            Shape::Candidates => "candidates",
            Shape::Werlog => "werlog",
        }
    }
}

/// Infer the source shape from its header line and content.
///
/// A `transcriptFile` column selects the error-segment shape, a `record_id`
/// column the candidate shape, and an `Individual WER:` line anywhere in the
/// text the WER-log shape. Unrecognized input falls back to the
/// error-segment shape, which parses it to zero records.
pub fn detect_shape(text: &str) -> Shape {
    let text = strip_bom(text);
    let header = text.lines().next().unwrap_or("");

    if header.contains("transcriptFile") {
        Shape::Errors
    } else if header.contains("record_id") {
        Shape::Candidates
    } else if text.contains("Individual WER:") {
        Shape::Werlog
    } else {
        Shape::Errors
    }
}

/// Pick the field delimiter by counting tab and comma occurrences across
/// the whole input. Tabs win only when strictly more frequent, so a comma
/// document with incidental tabs stays CSV and vice versa.
pub(crate) fn detect_delimiter(text: &str) -> u8 {
    let tabs = text.matches('\t').count();
    let commas = text.matches(',').count();
    if tabs > commas {
        b'\t'
    } else {
        b','
    }
}

/// Drop a leading UTF-8 byte order mark so header matching sees clean text
pub(crate) fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// Reduce a path cell to its base filename, tolerating either separator
/// style. `None` when nothing usable remains.
pub(crate) fn base_file_name(cell: &str) -> Option<String> {
    let name = cell
        .trim()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();

    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_prefers_majority() {
        assert_eq!(detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(detect_delimiter("a\tb\tc\nd\te\tf"), b'\t');
    }

    #[test]
    fn test_detect_delimiter_comma_wins_ties() {
        assert_eq!(detect_delimiter(""), b',');
        assert_eq!(detect_delimiter("a\tb,c"), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv_with_embedded_commas() {
        // One comma inside a phrase must not flip a two-column TSV
        let text = "transcriptFile\tlongFormError\na.wav\thello, there\nb.wav\tok\n";
        assert_eq!(detect_delimiter(text), b'\t');
    }

    #[test]
    fn test_detect_shape_by_header() {
        assert_eq!(detect_shape("transcriptFile,longFormStart\n"), Shape::Errors);
        assert_eq!(detect_shape("record_id,record_file\n"), Shape::Candidates);
    }

    #[test]
    fn test_detect_shape_werlog_by_content() {
        let text = "File: a.wav\nIndividual WER: 0.25\n";
        assert_eq!(detect_shape(text), Shape::Werlog);
    }

    #[test]
    fn test_detect_shape_fallback() {
        assert_eq!(detect_shape("some,random,data\n1,2,3\n"), Shape::Errors);
        assert_eq!(detect_shape(""), Shape::Errors);
    }

    #[test]
    fn test_detect_shape_ignores_bom() {
        assert_eq!(detect_shape("\u{feff}transcriptFile,longFormStart\n"), Shape::Errors);
    }

    #[test]
    fn test_base_file_name_strips_directories() {
        assert_eq!(base_file_name("a/b/clip1.wav"), Some("clip1.wav".to_string()));
        assert_eq!(base_file_name("C:\\audio\\clip2.wav"), Some("clip2.wav".to_string()));
        assert_eq!(base_file_name("clip3.wav"), Some("clip3.wav".to_string()));
    }

    #[test]
    fn test_base_file_name_empty_cells() {
        assert_eq!(base_file_name(""), None);
        assert_eq!(base_file_name("   "), None);
        assert_eq!(base_file_name("a/b/"), None);
    }
}
