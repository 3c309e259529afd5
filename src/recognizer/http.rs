//! HTTP client for the remote speech recognition service.

use crate::defaults;
use crate::error::{MeetscribeError, Result};
use crate::pipeline::types::{AudioChunk, RecognitionResult, RecognitionWord};
use crate::recognizer::client::Recognizer;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Request body sent to the recognition endpoint.
#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    /// Base64 of 16-bit little-endian PCM at 16kHz mono.
    audio_content: String,
    language_code: &'a str,
    diarization: DiarizationConfig,
}

#[derive(Debug, Serialize)]
struct DiarizationConfig {
    enabled: bool,
    speaker_count: u32,
}

/// Response body from the recognition endpoint.
#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    words: Vec<WireWord>,
    #[serde(default)]
    transcript: String,
}

#[derive(Debug, Deserialize)]
struct WireWord {
    text: String,
    /// Services omit the tag when diarization found a single voice.
    #[serde(default = "default_speaker_tag")]
    speaker_tag: u32,
    #[serde(default)]
    start_secs: f64,
}

fn default_speaker_tag() -> u32 {
    1
}

/// Encodes chunk samples for transmission.
///
/// The encoding is fixed — 16-bit little-endian PCM, base64 — so the same
/// chunk always produces the same payload.
pub fn encode_payload(samples: &[i16]) -> String {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Recognizer backed by an HTTP speech-to-text endpoint.
///
/// The remote contract is opaque beyond "accepts one chunk plus a language,
/// returns a speaker-tagged word list". HTTP status codes map onto the error
/// taxonomy: 401 is a rejected credential, 402/403 an exhausted allowance,
/// 408/429 and server errors are transient, anything else that is not a
/// parseable success is a malformed response.
pub struct HttpRecognizer {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpRecognizer {
    /// Creates a recognizer for the given endpoint URL.
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            api_token: None,
        }
    }

    /// Sets the bearer token sent with each request.
    pub fn with_token(mut self, token: &str) -> Self {
        self.api_token = Some(token.to_string());
        self
    }

    fn classify_status(status: reqwest::StatusCode) -> Option<MeetscribeError> {
        if status.is_success() {
            return None;
        }
        Some(match status.as_u16() {
            401 => MeetscribeError::Unauthenticated {
                message: "recognition service returned 401".to_string(),
            },
            402 | 403 => MeetscribeError::QuotaExhausted,
            408 | 429 => MeetscribeError::TransientNetwork {
                message: format!("recognition service returned {}", status),
            },
            code if status.is_server_error() => MeetscribeError::TransientNetwork {
                message: format!("recognition service returned {}", code),
            },
            code => MeetscribeError::MalformedResponse {
                message: format!("unexpected status {}", code),
            },
        })
    }
}

#[async_trait::async_trait]
impl Recognizer for HttpRecognizer {
    async fn recognize(&self, chunk: &AudioChunk) -> Result<RecognitionResult> {
        let body = RecognizeRequest {
            audio_content: encode_payload(&chunk.samples),
            language_code: &chunk.language,
            diarization: DiarizationConfig {
                enabled: true,
                speaker_count: defaults::DIARIZATION_SPEAKER_COUNT,
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(ref token) = self.api_token {
            request = request.bearer_auth(token);
        }

        // Transport failures (refused, reset, DNS, timeout) are transient;
        // retries are the caller's decision.
        let response = request
            .send()
            .await
            .map_err(|e| MeetscribeError::TransientNetwork {
                message: format!("request failed: {e}"),
            })?;

        if let Some(error) = Self::classify_status(response.status()) {
            return Err(error);
        }

        let parsed: RecognizeResponse =
            response
                .json()
                .await
                .map_err(|e| MeetscribeError::MalformedResponse {
                    message: format!("failed to decode response body: {e}"),
                })?;

        Ok(RecognitionResult {
            words: parsed
                .words
                .into_iter()
                .map(|w| RecognitionWord {
                    text: w.text,
                    speaker_tag: w.speaker_tag,
                    start_secs: w.start_secs,
                })
                .collect(),
            transcript: parsed.transcript,
        })
    }

    fn name(&self) -> &str {
        &self.endpoint
    }
}
