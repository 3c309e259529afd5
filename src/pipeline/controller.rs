//! Pipeline controller: the session state machine supervising capture,
//! assembly, transmission, and the transcript store.

use crate::capture::slicer::FragmentSlicer;
use crate::capture::source::CaptureSource;
use crate::defaults;
use crate::error::{MeetscribeError, Result};
use crate::pipeline::assembler::{AssemblerConfig, ChunkAssembler};
use crate::pipeline::reconstruct::reconstruct;
use crate::pipeline::report::{ErrorReporter, LogReporter};
use crate::pipeline::store::TranscriptStore;
use crate::pipeline::transmitter::{RetryPolicy, TransmitOutcome, TransmitResult, transmit_chunk};
use crate::pipeline::types::{AudioChunk, SessionSummary, TranscriptSegment};
use crate::recognizer::client::Recognizer;
use crate::recognizer::quota::UsageMeter;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;

/// Externally visible pipeline state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Capturing,
    /// Mid-rollover: the old chunk is draining while a new one opens.
    Rolling,
    Stopping,
    Error,
}

impl PipelineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::Capturing => "capturing",
            PipelineState::Rolling => "rolling",
            PipelineState::Stopping => "stopping",
            PipelineState::Error => "error",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the pipeline controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Recognition language code stamped onto every chunk.
    pub language: String,
    /// Fragment cadence (capture poll interval).
    pub fragment_cadence: Duration,
    /// Fragments per chunk before the size policy seals it.
    pub chunk_fragments: usize,
    /// Wall-clock rollover interval.
    pub rollover_interval: Duration,
    /// Retry policy for chunk transmission.
    pub retry: RetryPolicy,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            fragment_cadence: Duration::from_millis(defaults::FRAGMENT_CADENCE_MS),
            chunk_fragments: defaults::CHUNK_FRAGMENTS,
            rollover_interval: defaults::ROLLOVER_INTERVAL,
            retry: RetryPolicy::default(),
        }
    }
}

/// Generates a session id in meeting-code style.
fn generate_session_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("meeting-{}-{}", millis, COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// The only component the surrounding application talks to directly.
///
/// Owns the recognizer and usage meter; each `start()` spins up an
/// independently owned session task. There is no shared module state — a
/// session lives entirely in its [`SessionHandle`].
pub struct PipelineController {
    config: ControllerConfig,
    recognizer: Arc<dyn Recognizer>,
    meter: Arc<dyn UsageMeter>,
    reporter: Arc<dyn ErrorReporter>,
}

impl PipelineController {
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        meter: Arc<dyn UsageMeter>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            config,
            recognizer,
            meter,
            reporter: Arc::new(LogReporter),
        }
    }

    /// Sets a custom error reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Starts a transcription session over the given capture source.
    ///
    /// Fails with `QuotaExhausted` when no allowance remains, or with the
    /// capture error when the source cannot start; in both cases no session
    /// exists afterwards and the caller may retry. Must be called from
    /// within a Tokio runtime.
    pub fn start(&self, mut capture: Box<dyn CaptureSource>) -> Result<SessionHandle> {
        if self.meter.remaining_secs() == 0 {
            return Err(MeetscribeError::QuotaExhausted);
        }

        capture.start()?;

        let session_id = generate_session_id();
        let store = Arc::new(TranscriptStore::new());
        let (state_tx, state_rx) = watch::channel(PipelineState::Capturing);
        let (stop_tx, stop_rx) = oneshot::channel();

        let session = Session {
            capture,
            session_id: session_id.clone(),
            config: self.config.clone(),
            recognizer: Arc::clone(&self.recognizer),
            meter: Arc::clone(&self.meter),
            reporter: Arc::clone(&self.reporter),
            store: Arc::clone(&store),
            state_tx,
        };

        let task = tokio::spawn(session.run(stop_rx));

        Ok(SessionHandle {
            session_id,
            store,
            state_rx,
            stop_tx: Some(stop_tx),
            task,
        })
    }
}

/// Handle to a running session.
pub struct SessionHandle {
    session_id: String,
    store: Arc<TranscriptStore>,
    state_rx: watch::Receiver<PipelineState>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<Result<SessionSummary>>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Current pipeline state.
    pub fn state(&self) -> PipelineState {
        *self.state_rx.borrow()
    }

    /// The currently visible, ordered transcript.
    pub fn snapshot(&self) -> Vec<TranscriptSegment> {
        self.store.snapshot()
    }

    /// Shared access to the session's transcript store.
    pub fn store(&self) -> Arc<TranscriptStore> {
        Arc::clone(&self.store)
    }

    /// Stops the session: seals and transmits the partial chunk, waits for
    /// in-flight transmissions to flush, and returns the session summary.
    pub async fn stop(mut self) -> Result<SessionSummary> {
        if let Some(tx) = self.stop_tx.take() {
            // Send fails only when the session already ended on its own.
            let _ = tx.send(());
        }
        self.join().await
    }

    /// Waits for the session to end on its own (finite sources, fatal
    /// errors) without requesting a stop.
    pub async fn wait(self) -> Result<SessionSummary> {
        self.join().await
    }

    async fn join(self) -> Result<SessionSummary> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(MeetscribeError::Other(format!(
                "session task failed: {e}"
            ))),
        }
    }
}

/// Owned state of one running session.
struct Session {
    capture: Box<dyn CaptureSource>,
    session_id: String,
    config: ControllerConfig,
    recognizer: Arc<dyn Recognizer>,
    meter: Arc<dyn UsageMeter>,
    reporter: Arc<dyn ErrorReporter>,
    store: Arc<TranscriptStore>,
    state_tx: watch::Sender<PipelineState>,
}

impl Session {
    async fn run(mut self, mut stop_rx: oneshot::Receiver<()>) -> Result<SessionSummary> {
        let mut slicer = FragmentSlicer::new(defaults::SAMPLE_RATE);
        let mut assembler = ChunkAssembler::new(AssemblerConfig {
            max_fragments: self.config.chunk_fragments,
            language: self.config.language.clone(),
        });

        let mut cadence = tokio::time::interval(self.config.fragment_cadence);
        cadence.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut rollover = tokio::time::interval_at(
            tokio::time::Instant::now() + self.config.rollover_interval,
            self.config.rollover_interval,
        );
        rollover.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel::<TransmitOutcome>();
        let mut in_flight: usize = 0;
        let mut consecutive_read_errors: u32 = 0;
        let mut fatal: Option<MeetscribeError> = None;

        // Main loop: capture cadence, rollover timer, transmission outcomes,
        // and the stop signal are independent events. Neither capture nor
        // chunk accumulation ever waits on an in-flight transmission.
        loop {
            tokio::select! {
                _ = &mut stop_rx => {
                    break;
                }
                _ = cadence.tick() => {
                    match self.capture.read_samples() {
                        Ok(samples) => {
                            consecutive_read_errors = 0;
                            if samples.is_empty() {
                                if self.capture.is_finite() {
                                    // Source exhausted; end the session.
                                    break;
                                }
                            } else if let Some(fragment) = slicer.cut(samples)
                                && let Some(chunk) = assembler.push(fragment)
                            {
                                self.dispatch(chunk, &outcome_tx);
                                in_flight += 1;
                            }
                        }
                        Err(e) => {
                            consecutive_read_errors += 1;
                            self.reporter.report("capture", &e);
                            if consecutive_read_errors >= defaults::MAX_CAPTURE_ERRORS {
                                fatal = Some(MeetscribeError::CaptureFailed {
                                    message: format!(
                                        "{consecutive_read_errors} consecutive read failures"
                                    ),
                                });
                                break;
                            }
                        }
                    }
                }
                _ = rollover.tick() => {
                    let _ = self.state_tx.send(PipelineState::Rolling);
                    if let Some(chunk) = assembler.rollover() {
                        self.dispatch(chunk, &outcome_tx);
                        in_flight += 1;
                    }
                    let _ = self.state_tx.send(PipelineState::Capturing);
                }
                Some(outcome) = outcome_rx.recv() => {
                    in_flight -= 1;
                    if let Some(error) = self.handle_outcome(outcome) {
                        fatal = Some(error);
                        break;
                    }
                }
            }
        }

        // No new chunks are opened past this point.
        let _ = self.state_tx.send(if fatal.is_some() {
            PipelineState::Error
        } else {
            PipelineState::Stopping
        });

        if let Err(e) = self.capture.stop() {
            self.reporter.report("capture", &e);
        }

        if fatal.is_none() {
            // Flush the partial fragment and seal whatever accumulated, so
            // the final seconds of the meeting are transmitted too.
            match self.capture.read_samples() {
                Ok(samples) => {
                    if let Some(fragment) = slicer.cut(samples)
                        && let Some(chunk) = assembler.push(fragment)
                    {
                        self.dispatch(chunk, &outcome_tx);
                        in_flight += 1;
                    }
                }
                Err(e) => self.reporter.report("capture", &e),
            }
            if let Some(chunk) = assembler.flush() {
                self.dispatch(chunk, &outcome_tx);
                in_flight += 1;
            }
        }

        // Let already-in-flight transmissions complete and flush rather than
        // aborting them.
        while in_flight > 0 {
            match outcome_rx.recv().await {
                Some(outcome) => {
                    in_flight -= 1;
                    if let Some(error) = self.handle_outcome(outcome) {
                        let _ = self.state_tx.send(PipelineState::Error);
                        fatal.get_or_insert(error);
                    }
                }
                None => break,
            }
        }

        let summary = SessionSummary {
            session_id: self.session_id.clone(),
            duration_secs: assembler.captured_secs(),
            chunks: assembler.next_index(),
            segments: self.store.len(),
        };

        let _ = self.state_tx.send(PipelineState::Idle);

        match fatal {
            Some(error) => Err(error),
            None => Ok(summary),
        }
    }

    /// Spawns the chunk's transmission; responses flow back through the
    /// outcome channel and may arrive out of chunk order.
    fn dispatch(&self, chunk: AudioChunk, outcome_tx: &mpsc::UnboundedSender<TransmitOutcome>) {
        let recognizer = Arc::clone(&self.recognizer);
        let meter = Arc::clone(&self.meter);
        let retry = self.config.retry.clone();
        let tx = outcome_tx.clone();
        tokio::spawn(async move {
            let outcome = transmit_chunk(recognizer, meter, chunk, retry).await;
            let _ = tx.send(outcome);
        });
    }

    /// Applies one transmission outcome to the store. Returns the error when
    /// it ends the session.
    fn handle_outcome(&self, outcome: TransmitOutcome) -> Option<MeetscribeError> {
        match outcome.result {
            TransmitResult::Recognized(result) => {
                let segments = reconstruct(&result, outcome.chunk_duration_secs, &self.session_id);
                self.store.insert(outcome.chunk_index, segments);
                None
            }
            TransmitResult::Abandoned(error) => {
                self.reporter.report("transmit", &error);
                self.store.skip(outcome.chunk_index);
                None
            }
            TransmitResult::SessionFatal(error) => {
                self.reporter.report("transmit", &error);
                self.store.skip(outcome.chunk_index);
                Some(error)
            }
        }
    }
}
