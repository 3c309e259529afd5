//! Error reporting seam for pipeline stages.

use crate::error::MeetscribeError;

/// Trait for reporting non-fatal pipeline errors.
///
/// Stages never print directly; the hosting shell decides where reports go
/// (stderr for the CLI, a captured list in tests).
pub trait ErrorReporter: Send + Sync {
    /// Reports an error from a named pipeline stage.
    fn report(&self, stage: &str, error: &MeetscribeError);
}

/// Default reporter that logs to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, stage: &str, error: &MeetscribeError) {
        eprintln!("meetscribe: [{}] {}", stage, error);
    }
}
