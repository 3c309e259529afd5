//! Command handler implementation for the daemon.

use crate::capture::microphone::MicrophoneSource;
use crate::capture::source::CaptureSource;
use crate::daemon::DaemonState;
use crate::ipc::protocol::{Command, Response};
use crate::ipc::server::{CommandHandler, IpcServer};
use crate::pipeline::controller::PipelineState;
use std::sync::Arc;

/// Command handler for daemon IPC commands.
pub struct DaemonCommandHandler {
    state: Arc<DaemonState>,
    server: Arc<IpcServer>,
}

impl DaemonCommandHandler {
    /// Creates a new command handler.
    pub fn new(state: DaemonState, server: Arc<IpcServer>) -> Self {
        Self {
            state: Arc::new(state),
            server,
        }
    }

    /// Start a transcription session over the configured microphone.
    async fn start_session(&self) -> Response {
        let mut session_guard = self.state.session.lock().await;

        if session_guard.is_some() {
            return Response::Error {
                message: "Already recording".to_string(),
            };
        }

        let capture: Box<dyn CaptureSource> =
            match MicrophoneSource::new(self.state.device.as_deref()) {
                Ok(source) => Box::new(source),
                Err(e) => {
                    return Response::Error {
                        message: format!("Failed to open microphone: {}", e),
                    };
                }
            };

        match self.state.controller.start(capture) {
            Ok(handle) => {
                let session_id = handle.session_id().to_string();
                *session_guard = Some(handle);
                Response::Started { session_id }
            }
            Err(e) => Response::Error {
                message: format!("Failed to start session: {}", e),
            },
        }
    }

    /// Stop the running session and return its summary.
    async fn stop_session(&self) -> Response {
        let mut session_guard = self.state.session.lock().await;

        if let Some(handle) = session_guard.take() {
            match handle.stop().await {
                Ok(summary) => Response::Stopped { summary },
                Err(e) => Response::Error {
                    message: format!("Session ended with error: {}", e),
                },
            }
        } else {
            Response::Error {
                message: "Not recording".to_string(),
            }
        }
    }

    /// Get daemon status.
    async fn get_status(&self) -> Response {
        let session_guard = self.state.session.lock().await;

        match session_guard.as_ref() {
            Some(handle) => Response::Status {
                state: handle.state().to_string(),
                session_id: Some(handle.session_id().to_string()),
                segments: handle.snapshot().len(),
            },
            None => Response::Status {
                state: PipelineState::Idle.to_string(),
                session_id: None,
                segments: 0,
            },
        }
    }

    /// Get the visible transcript of the running session.
    async fn get_snapshot(&self) -> Response {
        let session_guard = self.state.session.lock().await;

        match session_guard.as_ref() {
            Some(handle) => Response::Snapshot {
                segments: handle.snapshot(),
            },
            None => Response::Error {
                message: "Not recording".to_string(),
            },
        }
    }

    /// Shut the daemon down, stopping any running session first.
    async fn shutdown(&self) -> Response {
        {
            let mut session_guard = self.state.session.lock().await;
            if let Some(handle) = session_guard.take() {
                if let Err(e) = handle.stop().await {
                    eprintln!("meetscribe: session ended with error during shutdown: {}", e);
                }
            }
        }
        if let Err(e) = self.server.stop() {
            return Response::Error {
                message: format!("Failed to stop server: {}", e),
            };
        }
        Response::Ok
    }
}

#[async_trait::async_trait]
impl CommandHandler for DaemonCommandHandler {
    async fn handle(&self, command: Command) -> Response {
        match command {
            Command::Start => self.start_session().await,
            Command::Stop => self.stop_session().await,
            Command::Status => self.get_status().await,
            Command::Snapshot => self.get_snapshot().await,
            Command::Shutdown => self.shutdown().await,
        }
    }
}
