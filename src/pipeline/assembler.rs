//! Chunk assembler that accumulates fragments into sealed, bounded chunks.

use crate::defaults;
use crate::pipeline::types::{AudioChunk, AudioFragment};

/// Configuration for the chunk assembler.
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Fragments per chunk before the size policy seals it.
    pub max_fragments: usize,
    /// Recognition language stamped onto each sealed chunk.
    pub language: String,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            max_fragments: defaults::CHUNK_FRAGMENTS,
            language: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Turns the fragment stream into sealed [`AudioChunk`]s.
///
/// Two independent policies close a chunk: the size policy (after
/// `max_fragments` fragments) and the caller-driven rollover (wall-clock
/// timer owned by the session loop). A chunk is immutable once sealed; the
/// assembler immediately begins accumulating the next one.
pub struct ChunkAssembler {
    config: AssemblerConfig,
    next_index: u64,
    open_samples: Vec<i16>,
    open_fragments: usize,
    open_duration_secs: f64,
    /// Cumulative duration of sealed chunks; becomes the next chunk's
    /// session-relative start offset.
    sealed_duration_secs: f64,
}

impl ChunkAssembler {
    /// Creates an assembler with chunk indices starting at 0.
    pub fn new(config: AssemblerConfig) -> Self {
        Self {
            config,
            next_index: 0,
            open_samples: Vec::new(),
            open_fragments: 0,
            open_duration_secs: 0.0,
            sealed_duration_secs: 0.0,
        }
    }

    /// Accumulates one fragment, sealing the open chunk when the size policy
    /// threshold is reached.
    pub fn push(&mut self, fragment: AudioFragment) -> Option<AudioChunk> {
        self.open_samples.extend_from_slice(&fragment.samples);
        self.open_fragments += 1;
        self.open_duration_secs += fragment.duration_secs;

        if self.open_fragments >= self.config.max_fragments {
            Some(self.seal())
        } else {
            None
        }
    }

    /// Force-seals the open chunk at a rollover boundary.
    ///
    /// Returns `None` when nothing has accumulated — an empty rollover emits
    /// no chunk but costs nothing. Fragments arriving after the call belong
    /// to the next chunk.
    pub fn rollover(&mut self) -> Option<AudioChunk> {
        if self.open_fragments == 0 {
            None
        } else {
            Some(self.seal())
        }
    }

    /// Seals whatever is accumulated at session stop, even below the size
    /// threshold, so the final seconds of a meeting are not lost.
    pub fn flush(&mut self) -> Option<AudioChunk> {
        self.rollover()
    }

    /// Number of fragments in the currently open chunk.
    pub fn open_fragments(&self) -> usize {
        self.open_fragments
    }

    /// Index the next sealed chunk will carry.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Total duration captured so far (sealed plus open), in seconds.
    pub fn captured_secs(&self) -> f64 {
        self.sealed_duration_secs + self.open_duration_secs
    }

    fn seal(&mut self) -> AudioChunk {
        let index = self.next_index;
        self.next_index += 1;

        let chunk = AudioChunk {
            index,
            samples: std::mem::take(&mut self.open_samples),
            duration_secs: self.open_duration_secs,
            start_secs: self.sealed_duration_secs,
            language: self.config.language.clone(),
        };

        self.sealed_duration_secs += self.open_duration_secs;
        self.open_fragments = 0;
        self.open_duration_secs = 0.0;

        chunk
    }
}
