use crate::error::{MeetscribeError, Result};
use crate::pipeline::types::{AudioChunk, RecognitionResult};
use std::sync::Mutex;
use std::time::Duration;

/// Trait for the remote speech recognition service.
///
/// Exactly one round-trip per call; failures come back as typed errors and
/// never escape as panics. This trait allows swapping implementations (the
/// HTTP client vs a scripted mock).
#[async_trait::async_trait]
pub trait Recognizer: Send + Sync {
    /// Recognize one sealed chunk.
    ///
    /// The chunk carries its own language code. On success, returns the
    /// speaker-tagged word list (and/or flat transcript) for the chunk.
    async fn recognize(&self, chunk: &AudioChunk) -> Result<RecognitionResult>;

    /// Name of the backing service, for status and diagnostics.
    fn name(&self) -> &str;
}

/// One scripted call for [`MockRecognizer`].
#[derive(Debug)]
pub struct ScriptedCall {
    /// Simulated service latency before the outcome resolves.
    pub latency: Duration,
    /// The outcome to return.
    pub outcome: Result<RecognitionResult>,
}

impl ScriptedCall {
    pub fn ok(result: RecognitionResult) -> Self {
        Self {
            latency: Duration::ZERO,
            outcome: Ok(result),
        }
    }

    pub fn err(error: MeetscribeError) -> Self {
        Self {
            latency: Duration::ZERO,
            outcome: Err(error),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Mock recognizer for testing.
///
/// Scripted calls are consumed in order; once the script is exhausted, every
/// call returns a clone of the default result.
#[derive(Debug, Default)]
pub struct MockRecognizer {
    script: Mutex<Vec<ScriptedCall>>,
    default_result: RecognitionResult,
    calls: Mutex<u32>,
}

impl MockRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the result returned once the script is exhausted.
    pub fn with_default_result(mut self, result: RecognitionResult) -> Self {
        self.default_result = result;
        self
    }

    /// Appends a scripted call.
    pub fn then(self, call: ScriptedCall) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push(call);
        }
        self
    }

    /// Number of `recognize` calls made so far.
    pub fn call_count(&self) -> u32 {
        self.calls.lock().map(|c| *c).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl Recognizer for MockRecognizer {
    async fn recognize(&self, _chunk: &AudioChunk) -> Result<RecognitionResult> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }

        let next = self.script.lock().ok().and_then(|mut script| {
            if script.is_empty() {
                None
            } else {
                Some(script.remove(0))
            }
        });

        match next {
            Some(call) => {
                if !call.latency.is_zero() {
                    tokio::time::sleep(call.latency).await;
                }
                call.outcome
            }
            None => Ok(self.default_result.clone()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
