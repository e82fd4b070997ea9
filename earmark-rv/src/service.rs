//! Review service
//!
//! One `ReviewService` owns every piece of process-wide review state: the
//! corpus index, the loaded annotation, candidate, and transcription sets,
//! and the label log. Each load builds a complete replacement off to the
//! side and publishes it with a single assignment, so readers racing a
//! reload see either the old snapshot or the new one, never a mix. Decode
//! and filesystem work runs on the blocking pool; segment extraction is
//! additionally bounded by a timeout so one corrupt or enormous file
//! cannot stall the service.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use earmark_common::{Error, Result};

use crate::corpus::{CorpusEntry, CorpusIndex};
use crate::ingest::{
    self, parse_annotations, parse_candidates, parse_wer_log, AnnotationRecord, LabelCandidate,
    ParsedAnnotations, Shape, TranscriptionInfo,
};
use crate::labels::{LabelRecord, LabelStore};
use crate::segment;

/// Default bound on one segment decode/encode pass
pub const DEFAULT_EXTRACT_TIMEOUT: Duration = Duration::from_secs(30);

/// Summary returned by an annotation load
#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub shape: &'static str,
    pub record_count: usize,
    pub skipped_rows: usize,
}

/// Request body for appending a label.
///
/// Fields are optional at the wire level so validation can name what is
/// missing instead of failing JSON extraction.
#[derive(Debug, Clone, Deserialize)]
pub struct AppendLabelRequest {
    pub record_id: Option<String>,
    pub audio_file: Option<String>,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
}

/// One playlist item: a corpus entry joined with everything known about it
#[derive(Debug, Serialize)]
pub struct PlaylistItem {
    pub name: String,
    pub url: String,
    pub records: Vec<AnnotationRecord>,
    pub transcription: Option<TranscriptionInfo>,
}

/// Current load state across all data kinds
#[derive(Debug, Serialize)]
pub struct StatusView {
    pub root: Option<String>,
    pub entry_count: usize,
    pub annotation_files: usize,
    pub annotation_records: usize,
    pub transcription_entries: usize,
    pub candidate_count: usize,
    pub label_log: String,
}

/// Coordinating service holding all process-wide review state
pub struct ReviewService {
    corpus: RwLock<Option<Arc<CorpusIndex>>>,
    annotations: RwLock<Arc<ParsedAnnotations>>,
    transcriptions: RwLock<Arc<HashMap<String, TranscriptionInfo>>>,
    candidates: RwLock<Arc<Vec<LabelCandidate>>>,
    /// Serializes label-log file access so appends stay row-atomic
    label_store: Mutex<LabelStore>,
    label_log_path: PathBuf,
    extract_timeout: Duration,
}

impl ReviewService {
    pub fn new(label_log: PathBuf, extract_timeout: Duration) -> Self {
        Self {
            corpus: RwLock::new(None),
            annotations: RwLock::new(Arc::new(ParsedAnnotations::default())),
            transcriptions: RwLock::new(Arc::new(HashMap::new())),
            candidates: RwLock::new(Arc::new(Vec::new())),
            label_store: Mutex::new(LabelStore::new(label_log.clone())),
            label_log_path: label_log,
            extract_timeout,
        }
    }

    /// Scan `root_path` and publish the resulting index.
    ///
    /// The previous index stays published if the scan fails.
    pub async fn build_corpus(&self, root_path: &str) -> Result<usize> {
        let root = PathBuf::from(root_path);
        let index = tokio::task::spawn_blocking(move || CorpusIndex::build(&root))
            .await
            .map_err(|e| Error::Internal(format!("Corpus scan task failed: {}", e)))??;

        let count = index.len();
        info!(
            "Corpus built: {} entries under {}",
            count,
            index.root().display()
        );
        *self.corpus.write().await = Some(Arc::new(index));
        Ok(count)
    }

    /// Snapshot of the current corpus, if one has been built
    pub async fn corpus(&self) -> Option<Arc<CorpusIndex>> {
        self.corpus.read().await.clone()
    }

    /// Resolve a filename or extension-stripped stem against the corpus
    pub async fn resolve(&self, name: &str) -> Result<CorpusEntry> {
        let corpus = self
            .corpus
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::NotFound("No corpus loaded".to_string()))?;

        corpus
            .resolve(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("No audio file matches '{}'", name)))
    }

    /// Parse `text` in the declared or detected shape and publish it.
    ///
    /// Each shape replaces only its own cell; loading candidates leaves
    /// annotations and transcriptions untouched.
    pub async fn load_annotations(&self, text: &str, declared: Option<Shape>) -> LoadSummary {
        let shape = declared.unwrap_or_else(|| ingest::detect_shape(text));

        match shape {
            Shape::Errors => {
                let parsed = parse_annotations(text);
                let summary = LoadSummary {
                    shape: shape.as_str(),
                    record_count: parsed.record_count(),
                    skipped_rows: parsed.skipped_rows,
                };
                info!(
                    "Loaded {} annotation records for {} files ({} rows skipped)",
                    summary.record_count,
                    parsed.file_order.len(),
                    summary.skipped_rows
                );
                *self.annotations.write().await = Arc::new(parsed);
                summary
            }
            Shape::Candidates => {
                let parsed = parse_candidates(text);
                let summary = LoadSummary {
                    shape: shape.as_str(),
                    record_count: parsed.candidates.len(),
                    skipped_rows: parsed.skipped_rows,
                };
                info!(
                    "Loaded {} label candidates ({} rows skipped)",
                    summary.record_count, summary.skipped_rows
                );
                *self.candidates.write().await = Arc::new(parsed.candidates);
                summary
            }
            Shape::Werlog => {
                let parsed = parse_wer_log(text);
                let summary = LoadSummary {
                    shape: shape.as_str(),
                    record_count: parsed.len(),
                    skipped_rows: 0,
                };
                info!("Loaded transcription info for {} files", parsed.len());
                *self.transcriptions.write().await = Arc::new(parsed);
                summary
            }
        }
    }

    /// Load an annotation source from a file on the server
    pub async fn load_annotations_from_path(
        &self,
        path: &str,
        declared: Option<Shape>,
    ) -> Result<LoadSummary> {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(Error::InvalidPath(format!(
                "{} does not exist",
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(Error::InvalidPath(format!(
                "{} is not a file",
                path.display()
            )));
        }

        let text = tokio::fs::read_to_string(&path).await?;
        Ok(self.load_annotations(&text, declared).await)
    }

    /// Extract a padded segment of `name` as WAV bytes.
    ///
    /// Runs the decode/encode pass on the blocking pool, bounded by the
    /// configured timeout.
    pub async fn extract(&self, name: &str, start: f64, end: f64) -> Result<Vec<u8>> {
        let entry = self.resolve(name).await?;
        let path = entry.absolute_path.clone();

        let task = tokio::task::spawn_blocking(move || segment::extract_segment(&path, start, end));

        match tokio::time::timeout(self.extract_timeout, task).await {
            Ok(joined) => {
                joined.map_err(|e| Error::Internal(format!("Extraction task failed: {}", e)))?
            }
            Err(_) => Err(Error::Internal(format!(
                "Extraction of '{}' exceeded {:?}",
                name, self.extract_timeout
            ))),
        }
    }

    /// Validate and append one label; the log is untouched on rejection
    pub async fn append_label(&self, request: AppendLabelRequest) -> Result<LabelRecord> {
        let record_id = non_empty(request.record_id, "record_id")?;
        let audio_file = non_empty(request.audio_file, "audio_file")?;
        let start_time = request
            .start_time
            .ok_or_else(|| Error::Validation("start_time is required".to_string()))?;
        let end_time = request
            .end_time
            .ok_or_else(|| Error::Validation("end_time is required".to_string()))?;

        if !start_time.is_finite() || !end_time.is_finite() || end_time < start_time {
            return Err(Error::Validation(format!(
                "end_time {} must be >= start_time {}",
                end_time, start_time
            )));
        }

        let error_phrase = self.candidate_phrase(&record_id).await;
        let record = LabelRecord::new(record_id, audio_file, error_phrase, start_time, end_time);

        // The mutex guard spans the blocking write so appends stay serialized
        let store = self.label_store.lock().await;
        let snapshot = store.clone();
        let to_write = record.clone();
        tokio::task::spawn_blocking(move || snapshot.append(&to_write))
            .await
            .map_err(|e| Error::Internal(format!("Label write task failed: {}", e)))??;

        Ok(record)
    }

    /// Read every persisted label in file order
    pub async fn read_labels(&self) -> Result<Vec<LabelRecord>> {
        let store = self.label_store.lock().await;
        let snapshot = store.clone();
        tokio::task::spawn_blocking(move || snapshot.read_all())
            .await
            .map_err(|e| Error::Internal(format!("Label read task failed: {}", e)))?
    }

    /// Ordered corpus entries joined with annotations and transcription info.
    ///
    /// Records match by base filename first, then by stem, mirroring how
    /// annotation sources name files.
    pub async fn playlist(&self) -> Vec<PlaylistItem> {
        let corpus = self.corpus.read().await.clone();
        let annotations = self.annotations.read().await.clone();
        let transcriptions = self.transcriptions.read().await.clone();

        let Some(corpus) = corpus else {
            return Vec::new();
        };

        corpus
            .entries()
            .iter()
            .map(|entry| {
                let records = annotations
                    .by_file
                    .get(&entry.base_name)
                    .or_else(|| annotations.by_file.get(&entry.stem))
                    .cloned()
                    .unwrap_or_default();
                let transcription = transcriptions
                    .get(&entry.base_name)
                    .or_else(|| transcriptions.get(&entry.stem))
                    .cloned();
                PlaylistItem {
                    name: entry.base_name.clone(),
                    url: format!("/api/audio/{}", entry.base_name),
                    records,
                    transcription,
                }
            })
            .collect()
    }

    /// Current root, entry count, and per-kind load state
    pub async fn status(&self) -> StatusView {
        let corpus = self.corpus.read().await.clone();
        let annotations = self.annotations.read().await.clone();
        let transcriptions = self.transcriptions.read().await.clone();
        let candidates = self.candidates.read().await.clone();

        StatusView {
            root: corpus.as_ref().map(|c| c.root().display().to_string()),
            entry_count: corpus.map(|c| c.len()).unwrap_or(0),
            annotation_files: annotations.file_order.len(),
            annotation_records: annotations.record_count(),
            transcription_entries: transcriptions.len(),
            candidate_count: candidates.len(),
            label_log: self.label_log_path.display().to_string(),
        }
    }

    /// Example phrase of the first candidate matching `record_id`.
    ///
    /// No candidate set, or no match, yields an empty phrase rather than
    /// an error.
    async fn candidate_phrase(&self, record_id: &str) -> String {
        let candidates = self.candidates.read().await.clone();
        candidates
            .iter()
            .find(|c| c.record_id == record_id)
            .map(|c| c.example_phrase.clone())
            .unwrap_or_default()
    }
}

fn non_empty(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::Validation(format!("{} is required", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service_in(dir: &TempDir) -> ReviewService {
        ReviewService::new(dir.path().join("labels.csv"), DEFAULT_EXTRACT_TIMEOUT)
    }

    fn label_request(id: &str) -> AppendLabelRequest {
        AppendLabelRequest {
            record_id: Some(id.to_string()),
            audio_file: Some("clip1.wav".to_string()),
            start_time: Some(1.0),
            end_time: Some(2.5),
        }
    }

    #[tokio::test]
    async fn test_resolve_without_corpus() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp);

        assert!(matches!(
            service.resolve("clip1.wav").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_build_corpus_invalid_path() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp);

        assert!(matches!(
            service.build_corpus("/nonexistent/audio").await,
            Err(Error::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn test_load_replaces_only_its_own_cell() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp);

        let annotations = "transcriptFile,longFormStart,longFormEnd,longFormError,shortFormError\n\
                           clip1.wav,1.0,2.0,err,\n";
        let candidates = "record_id,record_file,example_phrase,record_time\n\
                          r-001,clip1.wav,phrase,1.0\n";

        service.load_annotations(annotations, None).await;
        service.load_annotations(candidates, None).await;

        let status = service.status().await;
        assert_eq!(status.annotation_records, 1);
        assert_eq!(status.candidate_count, 1);
    }

    #[tokio::test]
    async fn test_load_detects_shapes() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp);

        let summary = service
            .load_annotations("record_id,record_file\nr-001,clip1.wav\n", None)
            .await;
        assert_eq!(summary.shape, "candidates");

        let summary = service
            .load_annotations("File: a.wav\nIndividual WER: 0.5\n", None)
            .await;
        assert_eq!(summary.shape, "werlog");
    }

    #[tokio::test]
    async fn test_reload_replaces_wholesale() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp);

        let first = "transcriptFile,longFormStart,longFormEnd,longFormError,shortFormError\n\
                     clip1.wav,1.0,2.0,one,\n\
                     clip2.wav,2.0,3.0,two,\n";
        let second = "transcriptFile,longFormStart,longFormEnd,longFormError,shortFormError\n\
                      clip3.wav,4.0,5.0,three,\n";

        service.load_annotations(first, None).await;
        service.load_annotations(second, None).await;

        let status = service.status().await;
        assert_eq!(status.annotation_files, 1);
        assert_eq!(status.annotation_records, 1);
    }

    #[tokio::test]
    async fn test_append_label_rejected_before_any_write() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp);

        let mut request = label_request("r-001");
        request.end_time = None;

        assert!(matches!(
            service.append_label(request).await,
            Err(Error::Validation(_))
        ));
        assert!(!temp.path().join("labels.csv").exists());
    }

    #[tokio::test]
    async fn test_append_label_rejects_reversed_window() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp);

        let mut request = label_request("r-001");
        request.start_time = Some(5.0);
        request.end_time = Some(1.0);

        assert!(matches!(
            service.append_label(request).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_append_label_resolves_first_matching_candidate() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp);

        let candidates = "record_id,record_file,example_phrase,record_time\n\
                          r-001,clip1.wav,first phrase,1.0\n\
                          r-001,clip1.wav,second phrase,2.0\n";
        service.load_annotations(candidates, None).await;

        let record = service.append_label(label_request("r-001")).await.unwrap();
        assert_eq!(record.error_phrase, "first phrase");

        let read = service.read_labels().await.unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0], record);
    }

    #[tokio::test]
    async fn test_append_label_without_candidates_has_empty_phrase() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp);

        let record = service.append_label(label_request("r-999")).await.unwrap();
        assert_eq!(record.error_phrase, "");
        assert_eq!(record.duration, 1.5);
    }

    #[tokio::test]
    async fn test_status_empty_service() {
        let temp = TempDir::new().unwrap();
        let service = service_in(&temp);

        let status = service.status().await;
        assert_eq!(status.root, None);
        assert_eq!(status.entry_count, 0);
        assert_eq!(status.annotation_records, 0);
        assert_eq!(status.candidate_count, 0);
    }
}
