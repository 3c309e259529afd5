//! Default configuration constants for meetscribe.
//!
//! This module provides shared constants used across different configuration
//! types to ensure consistency and eliminate duplication.

use std::time::Duration;

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and upload size for voice audio.
pub const SAMPLE_RATE: u32 = 16000;

/// Default fragment cadence in milliseconds.
///
/// The capture loop slices the incoming sample stream into one fragment per
/// cadence tick. One second keeps fragments small enough that a partial
/// fragment lost at shutdown is negligible.
pub const FRAGMENT_CADENCE_MS: u64 = 1000;

/// Default number of fragments per chunk.
///
/// A chunk is sealed and sent for recognition after this many fragments
/// (about 5 seconds at the default cadence). Bounds memory and keeps
/// recognition latency low.
pub const CHUNK_FRAGMENTS: usize = 5;

/// Default rollover interval.
///
/// Independently of the fragment count, the open chunk is force-sealed on
/// this wall-clock interval so no single recognition request grows without
/// bound during long meetings.
pub const ROLLOVER_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Maximum transmission attempts per chunk.
///
/// A chunk that keeps failing with transient errors is abandoned after this
/// many attempts. The session continues; the chunk becomes a gap in the
/// transcript.
pub const MAX_TRANSMIT_ATTEMPTS: u32 = 3;

/// Base delay for exponential retry backoff.
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

/// Ceiling for a single transmission attempt.
///
/// An attempt that neither succeeds nor fails within this window is treated
/// as a transient network error.
pub const TRANSMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default recognition language code.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Speaker label prefix for diarized words.
///
/// The recognition service returns session-scoped integer speaker tags;
/// labels are rendered as e.g. "Speaker 1".
pub const SPEAKER_LABEL_PREFIX: &str = "Speaker";

/// Placeholder speaker label for results without per-word speaker tags.
pub const FALLBACK_SPEAKER: &str = "Speaker";

/// Assumed speaking rate for estimating timing of untagged transcripts.
///
/// When the recognizer returns only a flat transcript, the segment start is
/// estimated from the word count at this rate.
pub const FALLBACK_WORDS_PER_SEC: f64 = 2.5;

/// Consecutive capture read failures tolerated before the session is ended.
pub const MAX_CAPTURE_ERRORS: u32 = 10;

/// Estimated speaker count hint sent to the recognition service.
pub const DIARIZATION_SPEAKER_COUNT: u32 = 2;
