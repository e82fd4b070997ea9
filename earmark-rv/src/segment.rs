//! Audio segment extraction
//!
//! Decodes a source recording in full, widens the requested window by a
//! fixed padding on both sides, clips it to the file bounds, and re-encodes
//! the slice as 16-bit PCM WAV so the result plays anywhere without codec
//! negotiation. Bounds are rounded to whole milliseconds before slicing,
//! keeping extraction deterministic for repeated requests.

use std::io::Read;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use earmark_common::time::secs_to_millis;
use earmark_common::{Error, Result};

/// Context seconds added before and after the requested window
pub const SEGMENT_PADDING_SECS: f64 = 5.0;

/// Fully decoded audio: interleaved f32 samples plus stream parameters
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    /// Total duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        (self.samples.len() / self.channels as usize) as f64 / self.sample_rate as f64
    }
}

/// Decode an entire audio file to interleaved f32 samples.
///
/// # Errors
/// - `NotFound` when the file does not exist
/// - `Decode` when the container cannot be probed, no audio track is
///   present, or nothing decodes; individually corrupt packets are skipped
pub fn decode_file(path: &Path) -> Result<DecodedAudio> {
    if !path.exists() {
        return Err(Error::NotFound(path.display().to_string()));
    }

    let file = std::fs::File::open(path)
        .map_err(|e| Error::Decode(format!("Failed to open {}: {}", path.display(), e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Hint the format registry with the file extension
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::Decode(format!("Failed to probe format: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::Decode("No audio track found".to_string()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| Error::Decode("Sample rate not found".to_string()))?;
    let channels = codec_params
        .channels
        .map(|c| c.count() as u16)
        .ok_or_else(|| Error::Decode("Channel count not found".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| Error::Decode(format!("Failed to create decoder: {}", e)))?;

    let mut samples = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                // End of stream
                break;
            }
            Err(e) => {
                warn!("Error reading packet: {}", e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let buf = sample_buf.get_or_insert_with(|| {
                    SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec())
                });
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
            Err(e) => {
                warn!("Decode error: {}", e);
                continue;
            }
        }
    }

    if samples.is_empty() {
        return Err(Error::Decode(format!(
            "No decodable samples in {}",
            path.display()
        )));
    }

    debug!(
        "Decoded {} samples ({} frames) from {}",
        samples.len(),
        samples.len() / channels as usize,
        path.display()
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
        channels,
    })
}

/// Compute the padded extraction window for a file of `duration_secs`,
/// clipped to `[0, duration_secs]`
pub fn padded_window(start: f64, end: f64, duration_secs: f64) -> (f64, f64) {
    let seg_start = (start - SEGMENT_PADDING_SECS).max(0.0);
    let seg_end = (end + SEGMENT_PADDING_SECS).min(duration_secs);
    (seg_start, seg_end)
}

/// Extract `[start, end]` seconds of `path`, widened by the fixed padding
/// and clipped to the file, as a complete 16-bit PCM WAV byte stream.
///
/// The window is validated before any decoding; a window that clips to
/// nothing yields a valid empty WAV rather than an error.
pub fn extract_segment(path: &Path, start: f64, end: f64) -> Result<Vec<u8>> {
    if !start.is_finite() || !end.is_finite() || start < 0.0 || end < start {
        return Err(Error::Validation(format!(
            "Invalid segment window: start={}, end={}",
            start, end
        )));
    }

    let decoded = decode_file(path)?;
    let duration = decoded.duration_secs();
    let (seg_start, seg_end) = padded_window(start, end, duration);

    // seg_end is clipped to the duration but seg_start is not; clamping it
    // here keeps the sample arithmetic below within the decoded buffer even
    // for an astronomically large (yet valid) requested window
    let seg_start = seg_start.min(seg_end);

    let start_sample =
        frame_at_millis(secs_to_millis(seg_start), decoded.sample_rate) * decoded.channels as usize;
    let end_sample = (frame_at_millis(secs_to_millis(seg_end), decoded.sample_rate)
        * decoded.channels as usize)
        .min(decoded.samples.len());

    let slice = if start_sample < end_sample {
        &decoded.samples[start_sample..end_sample]
    } else {
        &[][..]
    };

    debug!(
        "Extracting {:.3}s..{:.3}s of {} ({} samples)",
        seg_start,
        seg_end,
        path.display(),
        slice.len()
    );

    write_wav(slice, decoded.sample_rate, decoded.channels)
}

fn frame_at_millis(millis: u64, sample_rate: u32) -> usize {
    ((millis * sample_rate as u64) / 1000) as usize
}

/// Encode interleaved f32 samples as a 16-bit PCM WAV byte stream.
///
/// The encoder writes through a named temporary file that is removed on
/// every exit path, success or failure.
fn write_wav(samples: &[f32], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut temp = NamedTempFile::new()?;

    let mut writer = WavWriter::new(temp.as_file_mut(), spec)
        .map_err(|e| Error::Internal(format!("Failed to start WAV encode: {}", e)))?;
    for &sample in samples {
        let quantized = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(quantized)
            .map_err(|e| Error::Internal(format!("Failed to encode sample: {}", e)))?;
    }
    writer
        .finalize()
        .map_err(|e| Error::Internal(format!("Failed to finalize WAV: {}", e)))?;

    let mut bytes = Vec::new();
    temp.reopen()?.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    const RATE: u32 = 8000;

    /// Write a mono 16-bit WAV with a deterministic sample ramp
    fn write_test_wav(path: &Path, seconds: f64) {
        let spec = WavSpec {
            channels: 1,
            sample_rate: RATE,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        let frames = (seconds * RATE as f64) as usize;
        for i in 0..frames {
            writer.write_sample(((i % 2000) as i32 - 1000) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn read_wav(bytes: &[u8]) -> (hound::WavSpec, usize) {
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        let frames = reader.len() as usize / spec.channels as usize;
        (spec, frames)
    }

    #[test]
    fn test_decode_missing_file() {
        let result = decode_file(Path::new("/nonexistent/clip.wav"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_decode_undecodable_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("garbage.wav");
        std::fs::write(&path, b"this is not audio").unwrap();

        let result = decode_file(&path);
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_decode_wav_sample_count() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("two_seconds.wav");
        write_test_wav(&path, 2.0);

        let decoded = decode_file(&path).unwrap();
        assert_eq!(decoded.sample_rate, RATE);
        assert_eq!(decoded.channels, 1);
        assert_eq!(decoded.samples.len(), (2.0 * RATE as f64) as usize);
        assert!((decoded.duration_secs() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_padded_window_clips_to_file() {
        // Requesting the whole file still lands on [0, D]
        assert_eq!(padded_window(0.0, 10.0, 10.0), (0.0, 10.0));
        // Interior request widens by the padding on both sides
        assert_eq!(padded_window(10.0, 12.0, 1000.0), (5.0, 17.0));
        // Short file clips both ends
        assert_eq!(padded_window(2.0, 3.0, 4.0), (0.0, 4.0));
    }

    #[test]
    fn test_extract_interior_window_is_exact() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("thirty.wav");
        write_test_wav(&path, 30.0);

        let bytes = extract_segment(&path, 10.0, 12.0).unwrap();
        let (spec, frames) = read_wav(&bytes);

        // [10, 12] widens to [5, 17]: twelve seconds
        assert_eq!(spec.sample_rate, RATE);
        assert_eq!(frames, (12.0 * RATE as f64) as usize);
    }

    #[test]
    fn test_extract_full_file_window() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("twelve.wav");
        write_test_wav(&path, 12.0);

        let bytes = extract_segment(&path, 0.0, 12.0).unwrap();
        let (_, frames) = read_wav(&bytes);

        assert_eq!(frames, (12.0 * RATE as f64) as usize);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clip.wav");
        write_test_wav(&path, 20.0);

        let first = extract_segment(&path, 6.0, 8.0).unwrap();
        let second = extract_segment(&path, 6.0, 8.0).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_preserves_sample_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ramp.wav");
        write_test_wav(&path, 20.0);

        let decoded = decode_file(&path).unwrap();
        let bytes = extract_segment(&path, 6.0, 8.0).unwrap();

        let reader = hound::WavReader::new(Cursor::new(bytes.as_slice())).unwrap();
        let extracted: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();

        // Window [6, 8] pads to [1, 13]; compare against the same slice of
        // the full decode, re-quantized the way the encoder does it
        let start = RATE as usize;
        let expected: Vec<i16> = decoded.samples[start..start + extracted.len()]
            .iter()
            .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .collect();

        assert_eq!(extracted, expected);
    }

    #[test]
    fn test_extract_invalid_window() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clip.wav");
        write_test_wav(&path, 2.0);

        assert!(matches!(
            extract_segment(&path, 5.0, 3.0),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            extract_segment(&path, -1.0, 3.0),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_extract_window_beyond_short_file_is_empty_wav() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("short.wav");
        write_test_wav(&path, 2.0);

        // [100, 101] pads to [95, 106], clips to [95, 2]: nothing left
        let bytes = extract_segment(&path, 100.0, 101.0).unwrap();
        let (_, frames) = read_wav(&bytes);
        assert_eq!(frames, 0);
    }

    #[test]
    fn test_extract_astronomical_window_is_empty_wav() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("short.wav");
        write_test_wav(&path, 1.0);

        // A finite window far past the end of any real file must clip to an
        // empty segment, not overflow the sample arithmetic
        let bytes = extract_segment(&path, 1e18, 1e18 + 1.0).unwrap();
        let (_, frames) = read_wav(&bytes);
        assert_eq!(frames, 0);
    }

    #[test]
    fn test_extract_missing_file() {
        assert!(matches!(
            extract_segment(Path::new("/nonexistent/clip.wav"), 0.0, 1.0),
            Err(Error::NotFound(_))
        ));
    }
}
