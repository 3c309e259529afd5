//! Error types for meetscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MeetscribeError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors
    #[error("Microphone permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Audio input device unavailable: {device}")]
    DeviceUnavailable { device: String },

    #[error("Audio capture failed: {message}")]
    CaptureFailed { message: String },

    // Recognition transmission errors
    #[error("Transcription allowance exhausted")]
    QuotaExhausted,

    #[error("Transient network error: {message}")]
    TransientNetwork { message: String },

    #[error("Recognition service returned a malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Recognition credential rejected: {message}")]
    Unauthenticated { message: String },

    // IPC errors
    #[error("IPC socket error: {message}")]
    IpcSocket { message: String },

    #[error("IPC protocol error: {message}")]
    IpcProtocol { message: String },

    #[error("IPC connection failed: {message}")]
    IpcConnection { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl MeetscribeError {
    /// True if a failed chunk transmission may be retried.
    ///
    /// Only transient network failures qualify; quota, credential, and
    /// malformed-response failures must surface immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MeetscribeError::TransientNetwork { .. })
    }

    /// True if the error ends the whole session rather than a single chunk.
    ///
    /// Quota exhaustion leaves nothing further to transcribe; a rejected
    /// credential will fail every subsequent chunk the same way.
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            MeetscribeError::QuotaExhausted | MeetscribeError::Unauthenticated { .. }
        )
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, MeetscribeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_file_not_found_display() {
        let error = MeetscribeError::ConfigFileNotFound {
            path: "/path/to/config.toml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found at /path/to/config.toml"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = MeetscribeError::ConfigInvalidValue {
            key: "chunking.fragments".to_string(),
            message: "must be positive".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for chunking.fragments: must be positive"
        );
    }

    #[test]
    fn test_permission_denied_display() {
        let error = MeetscribeError::PermissionDenied {
            message: "user declined microphone access".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Microphone permission denied: user declined microphone access"
        );
    }

    #[test]
    fn test_device_unavailable_display() {
        let error = MeetscribeError::DeviceUnavailable {
            device: "default".to_string(),
        };
        assert_eq!(error.to_string(), "Audio input device unavailable: default");
    }

    #[test]
    fn test_quota_exhausted_display() {
        assert_eq!(
            MeetscribeError::QuotaExhausted.to_string(),
            "Transcription allowance exhausted"
        );
    }

    #[test]
    fn test_transient_network_display() {
        let error = MeetscribeError::TransientNetwork {
            message: "connection reset".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Transient network error: connection reset"
        );
    }

    #[test]
    fn test_malformed_response_display() {
        let error = MeetscribeError::MalformedResponse {
            message: "missing word list".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Recognition service returned a malformed response: missing word list"
        );
    }

    #[test]
    fn test_unauthenticated_display() {
        let error = MeetscribeError::Unauthenticated {
            message: "token expired".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Recognition credential rejected: token expired"
        );
    }

    #[test]
    fn test_only_transient_errors_are_retryable() {
        assert!(
            MeetscribeError::TransientNetwork {
                message: "timeout".to_string()
            }
            .is_retryable()
        );
        assert!(!MeetscribeError::QuotaExhausted.is_retryable());
        assert!(
            !MeetscribeError::MalformedResponse {
                message: "bad json".to_string()
            }
            .is_retryable()
        );
        assert!(
            !MeetscribeError::Unauthenticated {
                message: "expired".to_string()
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_session_fatal_classification() {
        assert!(MeetscribeError::QuotaExhausted.is_session_fatal());
        assert!(
            MeetscribeError::Unauthenticated {
                message: "expired".to_string()
            }
            .is_session_fatal()
        );
        assert!(
            !MeetscribeError::TransientNetwork {
                message: "timeout".to_string()
            }
            .is_session_fatal()
        );
        assert!(
            !MeetscribeError::MalformedResponse {
                message: "bad json".to_string()
            }
            .is_session_fatal()
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: MeetscribeError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_str = "invalid = toml = syntax";
        let toml_error = toml::from_str::<toml::Value>(toml_str).unwrap_err();
        let error: MeetscribeError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<MeetscribeError>();
        assert_sync::<MeetscribeError>();
    }

    #[test]
    fn test_error_debug_format() {
        let error = MeetscribeError::DeviceUnavailable {
            device: "hw:1,0".to_string(),
        };
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("DeviceUnavailable"));
        assert!(debug_str.contains("hw:1,0"));
    }
}
