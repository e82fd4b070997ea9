//! WER-log block parsing
//!
//! Recognizes the per-file scoring blocks a word-error-rate evaluation run
//! prints:
//!
//! ```text
//! File: recordings/clip1.wav
//! Reference: The quick brown fox.
//! Prediction: The quick brown fax.
//! Reference (normalized): the quick brown fox
//! Prediction (normalized): the quick brown fax
//! Individual WER: 0.25
//! ```
//!
//! A block is committed when its `Individual WER:` line arrives; text that
//! matches nothing is ignored, so zero entries is a valid outcome.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::base_file_name;

/// Per-file transcription scoring from a WER evaluation log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionInfo {
    pub reference_normalized: String,
    pub prediction_normalized: String,
    pub wer: f64,
}

struct BlockRegexes {
    file: Regex,
    reference: Regex,
    prediction: Regex,
    wer: Regex,
}

fn block_regexes() -> &'static BlockRegexes {
    static REGEXES: OnceLock<BlockRegexes> = OnceLock::new();
    REGEXES.get_or_init(|| BlockRegexes {
        file: Regex::new(r"^File:\s*(.+)$").expect("valid regex"),
        reference: Regex::new(r"^Reference \(normalized\):\s*(.*)$").expect("valid regex"),
        prediction: Regex::new(r"^Prediction \(normalized\):\s*(.*)$").expect("valid regex"),
        wer: Regex::new(r"^Individual WER:\s*([\d.]+)").expect("valid regex"),
    })
}

#[derive(Default)]
struct PendingBlock {
    file: String,
    reference_normalized: String,
    prediction_normalized: String,
}

/// Parse WER-log text into transcription info keyed by audio base filename.
///
/// Within one log, a repeated filename keeps its last block, matching the
/// whole-cell replacement the loads apply.
pub fn parse_wer_log(text: &str) -> HashMap<String, TranscriptionInfo> {
    let regexes = block_regexes();
    let mut by_file = HashMap::new();
    let mut current: Option<PendingBlock> = None;

    for line in text.lines() {
        let line = line.trim_end();

        if let Some(caps) = regexes.file.captures(line) {
            current = base_file_name(&caps[1]).map(|file| PendingBlock {
                file,
                ..PendingBlock::default()
            });
        } else if let Some(caps) = regexes.reference.captures(line) {
            if let Some(block) = current.as_mut() {
                block.reference_normalized = caps[1].trim().to_string();
            }
        } else if let Some(caps) = regexes.prediction.captures(line) {
            if let Some(block) = current.as_mut() {
                block.prediction_normalized = caps[1].trim().to_string();
            }
        } else if let Some(caps) = regexes.wer.captures(line) {
            if let Some(block) = current.take() {
                let wer = caps[1].parse::<f64>().unwrap_or(0.0);
                by_file.insert(
                    block.file,
                    TranscriptionInfo {
                        reference_normalized: block.reference_normalized,
                        prediction_normalized: block.prediction_normalized,
                        wer,
                    },
                );
            }
        }
    }

    debug!("Parsed transcription info for {} files", by_file.len());

    by_file
}
