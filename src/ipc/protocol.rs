//! JSON message protocol for IPC between the CLI and the daemon.

use crate::pipeline::types::{SessionSummary, TranscriptSegment};
use serde::{Deserialize, Serialize};

/// Commands sent by the CLI to the daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Start a transcription session
    Start,
    /// Stop the session and return its summary
    Stop,
    /// Get daemon status
    Status,
    /// Get the visible transcript of the running session
    Snapshot,
    /// Shutdown the daemon
    Shutdown,
}

impl Command {
    /// Serialize command to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize command from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Responses sent by the daemon to the CLI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Command succeeded
    Ok,
    /// A session started
    Started { session_id: String },
    /// A session stopped with this summary
    Stopped { summary: SessionSummary },
    /// Current daemon status
    Status {
        state: String,
        session_id: Option<String>,
        segments: usize,
    },
    /// Visible transcript of the running session
    Snapshot { segments: Vec<TranscriptSegment> },
    /// Error occurred
    Error { message: String },
}

impl Response {
    /// Serialize response to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize response from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
