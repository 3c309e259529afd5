use crate::error::{MeetscribeError, Result};

/// Trait for audio capture sources.
///
/// A source exclusively owns its input device between `start()` and
/// `stop()`; the session loop polls `read_samples()` once per fragment
/// cadence. This trait allows swapping implementations (real microphone,
/// WAV file, mock).
pub trait CaptureSource: Send {
    /// Start capturing audio.
    ///
    /// Fails with [`MeetscribeError::PermissionDenied`] when the environment
    /// refuses microphone access, or [`MeetscribeError::DeviceUnavailable`]
    /// when no usable input device exists.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing and release the device.
    fn stop(&mut self) -> Result<()>;

    /// Drain the samples captured since the previous read.
    ///
    /// Returns 16-bit PCM at 16kHz mono. An empty vector from a live source
    /// is normal at startup; from a finite source it signals exhaustion.
    fn read_samples(&mut self) -> Result<Vec<i16>>;

    /// True for sources with a fixed amount of audio (files, pipes).
    ///
    /// The session loop ends the session on its own when a finite source is
    /// exhausted; a live microphone keeps polling until stopped.
    fn is_finite(&self) -> bool {
        false
    }
}

/// One phase of scripted mock output: `count` reads each returning a clone
/// of `samples`.
#[derive(Debug, Clone)]
pub struct ReadPhase {
    pub samples: Vec<i16>,
    pub count: u32,
}

/// Mock capture source for testing.
#[derive(Debug, Clone, Default)]
pub struct MockCaptureSource {
    started: bool,
    stopped: bool,
    phases: Vec<ReadPhase>,
    phase_index: usize,
    reads_in_phase: u32,
    live: bool,
    fail_start: Option<StartFailure>,
    fail_read: bool,
}

#[derive(Debug, Clone)]
enum StartFailure {
    PermissionDenied,
    DeviceUnavailable,
}

impl MockCaptureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the sample blocks returned by successive reads. Once the
    /// script is exhausted, reads return empty.
    pub fn with_phases(mut self, phases: Vec<ReadPhase>) -> Self {
        self.phases = phases;
        self
    }

    /// Convenience: `count` reads of one second of audio each.
    pub fn with_one_second_reads(self, count: u32) -> Self {
        self.with_phases(vec![ReadPhase {
            samples: vec![100i16; 16000],
            count,
        }])
    }

    /// Marks the source as live (microphone-like): empty reads do not end
    /// the session.
    pub fn as_live_source(mut self) -> Self {
        self.live = true;
        self
    }

    /// Configures `start()` to fail with a permission error.
    pub fn with_permission_denied(mut self) -> Self {
        self.fail_start = Some(StartFailure::PermissionDenied);
        self
    }

    /// Configures `start()` to fail with a missing-device error.
    pub fn with_device_unavailable(mut self) -> Self {
        self.fail_start = Some(StartFailure::DeviceUnavailable);
        self
    }

    /// Configures every read to fail.
    pub fn with_read_failure(mut self) -> Self {
        self.fail_read = true;
        self
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl CaptureSource for MockCaptureSource {
    fn start(&mut self) -> Result<()> {
        match self.fail_start {
            Some(StartFailure::PermissionDenied) => Err(MeetscribeError::PermissionDenied {
                message: "mock permission denied".to_string(),
            }),
            Some(StartFailure::DeviceUnavailable) => Err(MeetscribeError::DeviceUnavailable {
                device: "mock".to_string(),
            }),
            None => {
                self.started = true;
                Ok(())
            }
        }
    }

    fn stop(&mut self) -> Result<()> {
        self.stopped = true;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.fail_read {
            return Err(MeetscribeError::CaptureFailed {
                message: "mock read failure".to_string(),
            });
        }

        while let Some(phase) = self.phases.get(self.phase_index) {
            if self.reads_in_phase < phase.count {
                self.reads_in_phase += 1;
                return Ok(phase.samples.clone());
            }
            self.phase_index += 1;
            self.reads_in_phase = 0;
        }

        Ok(Vec::new())
    }

    fn is_finite(&self) -> bool {
        !self.live
    }
}
