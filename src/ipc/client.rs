//! IPC client for sending commands to the daemon.

use crate::error::{MeetscribeError, Result};
use crate::ipc::protocol::{Command, Response};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

/// Send a command to the daemon via Unix socket.
///
/// # Errors
/// Returns `MeetscribeError::IpcConnection` if the daemon is not reachable,
/// `MeetscribeError::IpcProtocol` if serialization fails on either side.
pub async fn send_command(socket_path: &Path, command: Command) -> Result<Response> {
    let stream =
        UnixStream::connect(socket_path)
            .await
            .map_err(|e| MeetscribeError::IpcConnection {
                message: format!("Failed to connect to daemon: {}", e),
            })?;

    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let mut payload = command.to_json().map_err(|e| MeetscribeError::IpcProtocol {
        message: format!("Failed to serialize command: {}", e),
    })?;
    payload.push('\n');

    writer
        .write_all(payload.as_bytes())
        .await
        .map_err(|e| MeetscribeError::IpcConnection {
            message: format!("Failed to write command: {}", e),
        })?;
    writer
        .flush()
        .await
        .map_err(|e| MeetscribeError::IpcConnection {
            message: format!("Failed to flush writer: {}", e),
        })?;

    let mut response_line = String::new();
    reader
        .read_line(&mut response_line)
        .await
        .map_err(|e| MeetscribeError::IpcConnection {
            message: format!("Failed to read response: {}", e),
        })?;

    Response::from_json(response_line.trim()).map_err(|e| MeetscribeError::IpcProtocol {
        message: format!("Failed to deserialize response: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_command_fails_without_daemon() {
        let result = send_command(Path::new("/tmp/meetscribe-no-such.sock"), Command::Status).await;
        assert!(matches!(
            result,
            Err(MeetscribeError::IpcConnection { .. })
        ));
    }
}
