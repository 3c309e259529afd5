//! Chunk transmission with bounded retry and success-only usage charging.

use crate::defaults;
use crate::error::MeetscribeError;
use crate::pipeline::types::{AudioChunk, RecognitionResult};
use crate::recognizer::client::Recognizer;
use crate::recognizer::quota::{UsageMeter, billable_secs};
use std::sync::Arc;
use std::time::Duration;

/// Retry policy for chunk transmission.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per chunk, including the first.
    pub max_attempts: u32,
    /// Backoff before retry n is `base_delay * 2^(n-1)`.
    pub base_delay: Duration,
    /// Per-attempt ceiling; a hung request counts as a transient failure.
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: defaults::MAX_TRANSMIT_ATTEMPTS,
            base_delay: defaults::RETRY_BASE_DELAY,
            request_timeout: defaults::TRANSMIT_TIMEOUT,
        }
    }
}

/// Resolution of one chunk's transmission.
#[derive(Debug)]
pub struct TransmitOutcome {
    pub chunk_index: u64,
    pub chunk_duration_secs: f64,
    pub result: TransmitResult,
}

#[derive(Debug)]
pub enum TransmitResult {
    /// The service recognized the chunk.
    Recognized(RecognitionResult),
    /// Retries exhausted or a non-retryable chunk failure; the chunk is a
    /// gap but the session continues.
    Abandoned(MeetscribeError),
    /// A failure that ends the whole session (quota, credential).
    SessionFatal(MeetscribeError),
}

/// Transmits one chunk, retrying transient failures with exponential backoff.
///
/// Exactly one request is outstanding for the chunk at any time. The usage
/// meter is charged only when the service responds successfully — a failed
/// transmission never consumes allowance.
pub async fn transmit_chunk(
    recognizer: Arc<dyn Recognizer>,
    meter: Arc<dyn UsageMeter>,
    chunk: AudioChunk,
    policy: RetryPolicy,
) -> TransmitOutcome {
    let chunk_index = chunk.index;
    let chunk_duration_secs = chunk.duration_secs;
    let mut attempt = 0u32;

    let result = loop {
        attempt += 1;

        let response = match tokio::time::timeout(policy.request_timeout, recognizer.recognize(&chunk))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(MeetscribeError::TransientNetwork {
                message: format!(
                    "no response within {}s",
                    policy.request_timeout.as_secs()
                ),
            }),
        };

        match response {
            Ok(recognized) => {
                meter.charge_secs(billable_secs(chunk_duration_secs));
                break TransmitResult::Recognized(recognized);
            }
            Err(error) if error.is_session_fatal() => {
                break TransmitResult::SessionFatal(error);
            }
            Err(error) if error.is_retryable() && attempt < policy.max_attempts => {
                let backoff = policy.base_delay * 2u32.saturating_pow(attempt - 1);
                tokio::time::sleep(backoff).await;
            }
            Err(error) => {
                break TransmitResult::Abandoned(error);
            }
        }
    };

    TransmitOutcome {
        chunk_index,
        chunk_duration_secs,
        result,
    }
}
