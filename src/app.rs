//! Composition root for the foreground (direct-call) hosting shell.

use crate::capture::microphone::{MicrophoneSource, suppress_audio_warnings};
use crate::capture::source::CaptureSource;
use crate::capture::wav::WavCaptureSource;
use crate::config::Config;
use crate::daemon::{build_controller, build_controller_with, controller_config};
use crate::pipeline::controller::SessionHandle;
use crate::pipeline::types::{SessionSummary, TranscriptSegment};
use owo_colors::OwoColorize;
use std::path::Path;
use std::time::Duration;

/// Per-invocation overrides from the command line.
#[derive(Debug, Default)]
pub struct RecordOptions {
    pub device: Option<String>,
    pub language: Option<String>,
    pub rollover: Option<Duration>,
    pub chunk_fragments: Option<usize>,
    pub quiet: bool,
}

fn apply_overrides(config: &mut Config, options: &RecordOptions) {
    if let Some(ref device) = options.device {
        config.capture.device = Some(device.clone());
    }
    if let Some(ref language) = options.language {
        config.recognition.language = language.clone();
    }
    if let Some(rollover) = options.rollover {
        config.chunking.rollover_secs = rollover.as_secs();
    }
    if let Some(fragments) = options.chunk_fragments {
        config.chunking.fragments = fragments;
    }
}

/// Prints segments that became visible since the last call.
fn print_new_segments(segments: &[TranscriptSegment], printed: &mut usize) {
    for segment in &segments[*printed..] {
        println!(
            "[{}] {}: {}",
            segment.timestamp.dimmed(),
            segment.speaker.cyan().bold(),
            segment.text
        );
    }
    *printed = segments.len();
}

fn print_summary(summary: &SessionSummary, quiet: bool) {
    if quiet {
        return;
    }
    let minutes = (summary.duration_secs / 60.0).floor() as u64;
    let seconds = (summary.duration_secs % 60.0).floor() as u64;
    eprintln!(
        "{} {} — {:02}:{:02} captured, {} chunk(s), {} segment(s)",
        "session".green(),
        summary.session_id,
        minutes,
        seconds,
        summary.chunks,
        summary.segments
    );
}

/// Record from the microphone until Ctrl+C, printing segments live.
pub async fn run_record(mut config: Config, options: RecordOptions) -> anyhow::Result<()> {
    suppress_audio_warnings();
    apply_overrides(&mut config, &options);

    let controller = build_controller(&config)?;
    let capture: Box<dyn CaptureSource> =
        Box::new(MicrophoneSource::new(config.capture.device.as_deref())?);
    let handle = controller.start(capture)?;

    if !options.quiet {
        eprintln!(
            "{} session {} (Ctrl+C to stop)",
            "recording".green().bold(),
            handle.session_id()
        );
    }

    let summary = follow_until_interrupt(handle).await?;
    print_summary(&summary, options.quiet);
    Ok(())
}

/// Poll the snapshot for new segments until Ctrl+C, then stop and flush.
async fn follow_until_interrupt(handle: SessionHandle) -> anyhow::Result<SessionSummary> {
    let mut printed = 0;
    let mut poll = tokio::time::interval(Duration::from_millis(500));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = poll.tick() => {
                print_new_segments(&handle.snapshot(), &mut printed);
            }
        }
    }

    let store = handle.store();
    let summary = handle.stop().await?;
    print_new_segments(&store.snapshot(), &mut printed);
    Ok(summary)
}

/// Transcribe a WAV file and print the full transcript.
pub async fn run_transcribe(
    mut config: Config,
    path: &Path,
    options: RecordOptions,
) -> anyhow::Result<()> {
    apply_overrides(&mut config, &options);

    let mut controller_cfg = controller_config(&config);
    // File replay is not paced by a microphone; drain it fast.
    controller_cfg.fragment_cadence = Duration::from_millis(10);
    let controller = build_controller_with(&config, controller_cfg)?;

    let source = WavCaptureSource::from_path(path)?;
    let handle = controller.start(Box::new(source))?;

    let store = handle.store();
    let summary = handle.wait().await?;

    let mut printed = 0;
    print_new_segments(&store.snapshot(), &mut printed);
    print_summary(&summary, options.quiet);
    Ok(())
}
