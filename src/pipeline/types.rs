//! Data types flowing through the transcription pipeline.

use serde::{Deserialize, Serialize};

/// One cadence tick of captured audio.
///
/// Fragments are owned by the chunk assembler from the moment they are cut;
/// offsets are relative to the start of capture.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFragment {
    /// PCM samples (16-bit signed integers, mono, 16kHz).
    pub samples: Vec<i16>,
    /// Capture-relative start offset in seconds.
    pub start_secs: f64,
    /// Fragment duration in seconds.
    pub duration_secs: f64,
}

impl AudioFragment {
    /// Creates a fragment from samples at a given capture offset.
    pub fn new(samples: Vec<i16>, start_secs: f64, duration_secs: f64) -> Self {
        Self {
            samples,
            start_secs,
            duration_secs,
        }
    }
}

/// A sealed slice of audio, sent as one recognition request.
///
/// Immutable once sealed; indices are gapless and strictly increasing within
/// a session.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    /// Monotonic chunk index, starting at 0 per session.
    pub index: u64,
    /// Concatenated fragment samples.
    pub samples: Vec<i16>,
    /// Total chunk duration in seconds.
    pub duration_secs: f64,
    /// Session-relative start offset (cumulative duration of prior chunks).
    pub start_secs: f64,
    /// Recognition language code, e.g. "en-US".
    pub language: String,
}

/// One word as returned by the recognition service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionWord {
    /// The recognized word text.
    pub text: String,
    /// Session-scoped speaker tag. Not stable across chunks.
    pub speaker_tag: u32,
    /// Chunk-relative start offset in seconds.
    pub start_secs: f64,
}

impl RecognitionWord {
    pub fn new(text: &str, speaker_tag: u32, start_secs: f64) -> Self {
        Self {
            text: text.to_string(),
            speaker_tag,
            start_secs,
        }
    }
}

/// Full result of recognizing one chunk.
///
/// `words` carries the diarized word list when the service produced one.
/// `transcript` is the flat text; reconstruction falls back to it when the
/// word list is empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecognitionResult {
    pub words: Vec<RecognitionWord>,
    pub transcript: String,
}

impl RecognitionResult {
    /// A result with a diarized word list.
    pub fn from_words(words: Vec<RecognitionWord>) -> Self {
        Self {
            words,
            transcript: String::new(),
        }
    }

    /// A result with only a flat transcript (no speaker tags).
    pub fn from_transcript(transcript: &str) -> Self {
        Self {
            words: Vec::new(),
            transcript: transcript.to_string(),
        }
    }

    /// True if the chunk contained no recognizable speech.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.transcript.trim().is_empty()
    }
}

/// A contiguous same-speaker run of transcribed text.
///
/// Segments are created once and never mutated; ordering within a session is
/// by chunk index, then intra-chunk start offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Speaker label, e.g. "Speaker 1".
    pub speaker: String,
    /// Concatenated word text.
    pub text: String,
    /// Chunk-relative timestamp, "MM:SS".
    pub timestamp: String,
    /// Owning session identifier.
    pub session_id: String,
}

/// Closing summary of a finished session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    /// Total captured audio duration in seconds.
    pub duration_secs: f64,
    /// Number of chunks sealed during the session.
    pub chunks: u64,
    /// Number of segments visible in the store.
    pub segments: usize,
}
