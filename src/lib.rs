//! meetscribe - live meeting transcription
//!
//! Captures meeting audio, slices it into bounded chunks, ships each chunk
//! to a remote speech recognition service, and reassembles the diarized
//! results into a stable, ordered transcript.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod capture;
pub mod config;
#[cfg(feature = "cpal-audio")]
pub mod daemon;
pub mod defaults;
pub mod error;
pub mod ipc;
pub mod pipeline;
pub mod recognizer;

#[cfg(feature = "cli")]
pub mod cli;

// Composition root for the foreground shell - needs everything
#[cfg(all(feature = "cpal-audio", feature = "cli"))]
pub mod app;

// Core traits (capture → recognize → store)
pub use capture::source::CaptureSource;
pub use recognizer::client::Recognizer;
pub use recognizer::quota::UsageMeter;

// Pipeline
pub use pipeline::controller::{
    ControllerConfig, PipelineController, PipelineState, SessionHandle,
};
pub use pipeline::store::TranscriptStore;
pub use pipeline::types::{SessionSummary, TranscriptSegment};

// Error handling
pub use error::{MeetscribeError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.2+abc1234"` when git hash is available, `"0.1.2"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(
                ver.contains('+'),
                "With GIT_HASH set, version should contain '+', got: {}",
                ver
            );
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
