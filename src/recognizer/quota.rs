//! Usage metering for the transcription allowance.

use std::sync::atomic::{AtomicU64, Ordering};

/// Caller-visible transcription allowance.
///
/// Queried before a session starts and charged per successfully transcribed
/// chunk — never on failure, so users are not billed for transcriptions they
/// did not receive. Hosted deployments plug in a meter backed by their
/// account service; the in-memory meter covers the CLI and tests.
pub trait UsageMeter: Send + Sync {
    /// Remaining allowance in seconds of audio.
    fn remaining_secs(&self) -> u64;

    /// Consumes allowance after a successful chunk transcription.
    fn charge_secs(&self, secs: u64);
}

/// In-memory allowance counter.
#[derive(Debug)]
pub struct InMemoryMeter {
    remaining: AtomicU64,
}

impl InMemoryMeter {
    /// Creates a meter with a fixed allowance.
    pub fn new(allowance_secs: u64) -> Self {
        Self {
            remaining: AtomicU64::new(allowance_secs),
        }
    }

    /// Creates a meter that never runs out.
    pub fn unlimited() -> Self {
        Self::new(u64::MAX)
    }
}

impl UsageMeter for InMemoryMeter {
    fn remaining_secs(&self) -> u64 {
        self.remaining.load(Ordering::Relaxed)
    }

    fn charge_secs(&self, secs: u64) {
        // Saturating: concurrent charges near zero must not wrap.
        let mut current = self.remaining.load(Ordering::Relaxed);
        loop {
            let next = current.saturating_sub(secs);
            match self.remaining.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
    }
}

/// Whole seconds charged for a chunk, rounded up.
pub fn billable_secs(duration_secs: f64) -> u64 {
    duration_secs.max(0.0).ceil() as u64
}
