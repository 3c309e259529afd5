//! Daemon mode for meetscribe - hosts the pipeline behind the IPC server.

pub mod handler;

use crate::capture::microphone::suppress_audio_warnings;
use crate::config::Config;
use crate::error::{MeetscribeError, Result};
use crate::ipc::server::IpcServer;
use crate::pipeline::controller::{ControllerConfig, PipelineController, SessionHandle};
use crate::pipeline::transmitter::RetryPolicy;
use crate::recognizer::http::HttpRecognizer;
use crate::recognizer::quota::{InMemoryMeter, UsageMeter};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Daemon state: the controller plus the current session, if any.
pub struct DaemonState {
    /// Audio device to capture from
    pub device: Option<String>,
    /// The pipeline controller (owns recognizer and usage meter)
    pub controller: PipelineController,
    /// Current session handle (Some = recording, None = idle)
    pub session: Mutex<Option<SessionHandle>>,
}

impl DaemonState {
    pub fn new(device: Option<String>, controller: PipelineController) -> Self {
        Self {
            device,
            controller,
            session: Mutex::new(None),
        }
    }

    /// Returns true if a session is currently running.
    pub async fn is_recording(&self) -> bool {
        self.session.lock().await.is_some()
    }
}

/// Builds a controller configuration from the loaded config file.
pub fn controller_config(config: &Config) -> ControllerConfig {
    ControllerConfig {
        language: config.recognition.language.clone(),
        fragment_cadence: Duration::from_millis(config.capture.fragment_cadence_ms),
        chunk_fragments: config.chunking.fragments,
        rollover_interval: Duration::from_secs(config.chunking.rollover_secs),
        retry: RetryPolicy::default(),
    }
}

/// Builds the controller from config: HTTP recognizer plus usage meter.
pub fn build_controller(config: &Config) -> Result<PipelineController> {
    build_controller_with(config, controller_config(config))
}

/// Builds the controller with an explicit pipeline configuration.
pub fn build_controller_with(
    config: &Config,
    controller_cfg: ControllerConfig,
) -> Result<PipelineController> {
    if config.recognition.endpoint.is_empty() {
        return Err(MeetscribeError::ConfigInvalidValue {
            key: "recognition.endpoint".to_string(),
            message: "no recognition endpoint configured".to_string(),
        });
    }

    let mut recognizer = HttpRecognizer::new(&config.recognition.endpoint);
    if let Some(ref token) = config.recognition.api_token {
        recognizer = recognizer.with_token(token);
    }

    let meter: Arc<dyn UsageMeter> = match config.recognition.allowance_secs {
        Some(secs) => Arc::new(InMemoryMeter::new(secs)),
        None => Arc::new(InMemoryMeter::unlimited()),
    };

    Ok(PipelineController::new(
        Arc::new(recognizer),
        meter,
        controller_cfg,
    ))
}

/// Run the daemon: start the IPC server and wait for shutdown.
///
/// # Returns
/// Ok(()) on graceful shutdown, error otherwise
pub async fn run_daemon(config: Config, socket_path: Option<PathBuf>, quiet: bool) -> Result<()> {
    // Suppress noisy JACK/ALSA warnings from backend probing
    suppress_audio_warnings();

    let controller = build_controller(&config)?;
    let state = DaemonState::new(config.capture.device.clone(), controller);

    let socket_path = socket_path.unwrap_or_else(IpcServer::default_socket_path);
    let server = Arc::new(IpcServer::new(socket_path));

    if !quiet {
        eprintln!(
            "meetscribe: IPC server listening at {}",
            server.socket_path().display()
        );
        eprintln!("meetscribe: daemon ready");
    }

    let handler = handler::DaemonCommandHandler::new(state, Arc::clone(&server));

    let server_task = Arc::clone(&server);
    let server_handle = tokio::spawn(async move { server_task.start(handler).await });

    // Wait for SIGTERM or SIGINT
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            if !quiet {
                eprintln!("\nmeetscribe: received SIGINT, shutting down");
            }
        }
        res = wait_for_sigterm() => {
            if let Err(e) = res {
                eprintln!("meetscribe: error setting up signal handler: {}", e);
            }
            if !quiet {
                eprintln!("\nmeetscribe: received SIGTERM, shutting down");
            }
        }
    }

    server.stop()?;
    if let Err(e) = server_handle.await {
        eprintln!("meetscribe: daemon server task failed: {e}");
    }

    if !quiet {
        eprintln!("meetscribe: daemon stopped");
    }

    Ok(())
}

/// Wait for SIGTERM signal (used by systemd).
#[cfg(unix)]
async fn wait_for_sigterm() -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};
    let mut sigterm = signal(SignalKind::terminate()).map_err(|e| {
        MeetscribeError::Other(format!("Failed to register SIGTERM handler: {}", e))
    })?;
    sigterm.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_sigterm() -> Result<()> {
    // On non-Unix, just wait forever (Ctrl+C will still work)
    std::future::pending::<()>().await
}
